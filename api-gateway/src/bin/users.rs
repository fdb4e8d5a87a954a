//! User Admin Lambda - admin-level provisioning against Cognito.
//!
//! Endpoints:
//! - POST /v1/admin/users - Create an account with the temporary password
//! - PUT /v1/admin/users/password - Set a permanent password
//! - POST /v1/admin/users/verify-email - Mark the email attribute verified
//! - POST /v1/admin/users/provision - Create, set password, verify in sequence

use aws_config::{BehaviorVersion, Region};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response};
use shared::{parse_body, AdminGateway, ApiResponse, AuthConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Create / verify-email request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsernameRequest {
    username: String,
}

/// Set-password / provision request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRequest {
    username: String,
    password: String,
}

/// Application state
struct AppState {
    admin: AdminGateway,
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
            admin: AdminGateway::new(client, config),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Admin request: {} {}", method, path);

    match (method, path) {
        ("POST", "/v1/admin/users") => {
            let request: UsernameRequest = parse_body!(event.body());

            match state.admin.admin_create_user(&request.username).await {
                Ok(created) => json_response(201, &ApiResponse::success(created)),
                Err(e) => error_response(&e.into()),
            }
        }

        ("PUT", "/v1/admin/users/password") => {
            let request: CredentialRequest = parse_body!(event.body());

            match state
                .admin
                .admin_set_password(&request.username, &request.password)
                .await
            {
                Ok(()) => json_response(
                    200,
                    &ApiResponse::success(serde_json::json!({ "passwordSet": true })),
                ),
                Err(e) => error_response(&e.into()),
            }
        }

        ("POST", "/v1/admin/users/verify-email") => {
            let request: UsernameRequest = parse_body!(event.body());

            match state.admin.admin_verify_email(&request.username).await {
                Ok(()) => json_response(
                    200,
                    &ApiResponse::success(serde_json::json!({ "emailVerified": true })),
                ),
                Err(e) => error_response(&e.into()),
            }
        }

        ("POST", "/v1/admin/users/provision") => {
            let request: CredentialRequest = parse_body!(event.body());

            match state
                .admin
                .provision_user(&request.username, &request.password)
                .await
            {
                Ok(created) => json_response(201, &ApiResponse::success(created)),
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
