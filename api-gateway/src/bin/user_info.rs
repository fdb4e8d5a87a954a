//! User Info Lambda - fetches the caller's database row.
//!
//! Receives the raw API Gateway proxy event, pulls the caller's subject from
//! the Cognito authorizer claims, and returns the matching row from the
//! `users` table as a proxy-shaped JSON response.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use serde_json::{json, Value};
use shared::{fetch_user_by_id, ApiResponse, DatabaseConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    db_config: DatabaseConfig,
}

impl AppState {
    fn new() -> Result<Self, Error> {
        Ok(Self {
            db_config: DatabaseConfig::from_env()?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    info!("User info lookup");

    match fetch_user_by_id(&state.db_config, &event.payload).await {
        Ok(record) => proxy_response(200, &ApiResponse::success(record)),
        Err(e) => {
            let e = shared::Error::from(e);
            proxy_response(e.status_code(), &ApiResponse::<()>::error(e.to_string()))
        }
    }
}

/// Build an API Gateway proxy response object.
fn proxy_response<T: Serialize>(status: u16, body: &T) -> Result<Value, Error> {
    Ok(json!({
        "statusCode": status,
        "headers": { "content-type": "application/json" },
        "body": serde_json::to_string(body)?,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new()?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
