//! Pre-Token-Generation Lambda - Cognito trigger.
//!
//! Adds a `prefixed_sub` claim to the tokens Cognito is about to issue and
//! echoes the event back, as Cognito triggers require.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{override_token_claims, PreTokenGenerationEvent};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    prefix: String,
}

impl AppState {
    fn new() -> Result<Self, Error> {
        let prefix = std::env::var("CLAIM_PREFIX").map_err(|_| "CLAIM_PREFIX not set")?;
        Ok(Self { prefix })
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<PreTokenGenerationEvent>,
) -> Result<PreTokenGenerationEvent, Error> {
    info!("Pre-token-generation trigger");

    override_token_claims(event.payload, &state.prefix).map_err(|e| {
        error!(error = %e, "claims override failed");
        Error::from(e)
    })
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
