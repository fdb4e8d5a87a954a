//! Shared library for the auth gateway Lambda functions.
//!
//! This crate provides the Cognito auth/admin gateways, claims handling,
//! the user-record lookup, and common configuration/error/HTTP types used
//! across all Lambda functions.

pub mod admin;
pub mod auth;
pub mod claims;
pub mod config;
pub mod db;
pub mod error;
pub mod http;

pub use admin::{AdminGateway, UserCreated};
pub use auth::{compute_secret_hash, AuthGateway, ResetToken, Tokens};
pub use claims::{extract_subject, override_token_claims, PreTokenGenerationEvent};
pub use config::{AuthConfig, DatabaseConfig};
pub use db::{fetch_user_by_id, UserRecord};
pub use error::{AuthError, ClaimsError, Error, LookupError, Result};
pub use http::ApiResponse;
