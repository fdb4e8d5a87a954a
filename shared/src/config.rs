//! Configuration management for Lambda functions.
//!
//! Configuration is loaded once at process start and passed into the
//! gateways explicitly. There are no default values: every variable must be
//! set, so credentials are never accidentally shared across environments.

use std::env;

use crate::Error;

/// Cognito app-client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// App client id
    pub client_id: String,
    /// App client secret (used for the secret hash)
    pub client_secret: String,
    /// User pool id
    pub user_pool_id: String,
    /// AWS region of the user pool
    pub region: String,
    /// Temporary password assigned by admin user creation
    pub temporary_password: String,
}

impl AuthConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            client_id: require("CLIENT_ID")?,
            client_secret: require("CLIENT_SECRET")?,
            user_pool_id: require("USER_POOL_ID")?,
            region: require("AWS_REGION")?,
            temporary_password: require("TEMPORARY_PASSWORD")?,
        })
    }
}

/// Database connection configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub db_name: String,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            host: require("DB_HOST")?,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            db_name: require("DB_NAME")?,
        })
    }
}

fn require(name: &str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::Config(format!("{} not set", name)))
}
