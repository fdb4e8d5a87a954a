//! Password Reset Lambda - out-of-band reset flow against Cognito.
//!
//! Endpoints:
//! - POST /v1/auth/password-reset - Request a confirmation code
//! - POST /v1/auth/password-reset/confirm - Confirm the code, set new password

use aws_config::{BehaviorVersion, Region};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response};
use shared::{parse_body, ApiResponse, AuthConfig, AuthGateway};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Start-reset request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResetRequest {
    username: String,
}

/// Confirm-reset request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmResetRequest {
    username: String,
    code: String,
    new_password: String,
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

    info!("Password reset request: {} {}", method, path);

    match (method, path) {
        ("POST", "/v1/auth/password-reset") => {
            let request: StartResetRequest = parse_body!(event.body());

            match state.auth.start_password_reset(&request.username).await {
                Ok(delivery) => json_response(200, &ApiResponse::success(delivery)),
                Err(e) => error_response(&e.into()),
            }
        }

        ("POST", "/v1/auth/password-reset/confirm") => {
            let request: ConfirmResetRequest = parse_body!(event.body());

            match state
                .auth
                .confirm_password_reset(&request.username, &request.code, &request.new_password)
                .await
            {
                Ok(()) => json_response(
                    200,
                    &ApiResponse::success(serde_json::json!({ "reset": true })),
                ),
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
