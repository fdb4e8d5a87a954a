//! Login Lambda - password-based authentication against Cognito.
//!
//! Endpoints:
//! - POST /v1/auth/login - Exchange username/password for tokens

use aws_config::{BehaviorVersion, Region};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response};
use shared::{parse_body, ApiResponse, AuthConfig, AuthGateway};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Login request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
    password: String,
}

/// Application state
struct AppState {
    auth: AuthGateway,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = AuthConfig::from_env()?;
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let client = aws_sdk_cognitoidentityprovider::Client::new(&aws_config);

        Ok(Self {
            auth: AuthGateway::new(client, config),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Auth request: {} {}", method, path);

    match (method, path) {
        ("POST", "/v1/auth/login") => {
            let request: LoginRequest = parse_body!(event.body());

            match state.auth.login(&request.username, &request.password).await {
                Ok(tokens) => json_response(200, &ApiResponse::success(tokens)),
                Err(e) => error_response(&e.into()),
            }
        }

        _ => json_response(404, &ApiResponse::<()>::error("Not found")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
