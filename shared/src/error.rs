//! Error types for the auth gateway Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the Cognito auth and admin gateways.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The provider rejected the username/password pair
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The username is unknown to the provider
    #[error("user not found")]
    UserNotFound,

    /// An account with this username already exists
    #[error("user already exists")]
    UserExists,

    /// The confirmation code was wrong or expired
    #[error("invalid or expired confirmation code")]
    InvalidCode,

    /// The password failed provider-side complexity rules
    #[error("password rejected by policy: {0}")]
    PolicyViolation(String),

    /// Transport failure or an unexpected provider response
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Errors from navigating an event's claim bundle.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClaimsError {
    /// The subject claim is present but empty
    #[error("missing subject in claims")]
    MissingSubject,

    /// A segment of the expected event structure is absent
    #[error("malformed event: missing {0}")]
    MalformedEvent(String),
}

/// Errors from the user-record database lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Claims extraction failed before any database work
    #[error(transparent)]
    Claims(#[from] ClaimsError),

    /// No row matched the subject identifier
    #[error("user not found in users table")]
    NotFound,

    /// Could not open a database connection
    #[error("database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// The query itself failed
    #[error("database query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),
}

/// Top-level error for Lambda handlers.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Auth(AuthError::InvalidCredentials) => 401,
            Error::Auth(AuthError::InvalidCode) => 401,
            Error::Auth(AuthError::UserNotFound) => 404,
            Error::Auth(AuthError::UserExists) => 409,
            Error::Auth(AuthError::PolicyViolation(_)) => 400,
            Error::Auth(AuthError::ProviderUnavailable(_)) => 502,
            Error::Claims(ClaimsError::MissingSubject) => 401,
            Error::Claims(ClaimsError::MalformedEvent(_)) => 400,
            Error::Lookup(LookupError::Claims(ClaimsError::MissingSubject)) => 401,
            Error::Lookup(LookupError::Claims(ClaimsError::MalformedEvent(_))) => 400,
            Error::Lookup(LookupError::NotFound) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::from(AuthError::InvalidCredentials).status_code(), 401);
        assert_eq!(Error::from(AuthError::UserNotFound).status_code(), 404);
        assert_eq!(Error::from(AuthError::UserExists).status_code(), 409);
        assert_eq!(
            Error::from(AuthError::PolicyViolation("too short".into())).status_code(),
            400
        );
        assert_eq!(
            Error::from(AuthError::ProviderUnavailable("timeout".into())).status_code(),
            502
        );
        assert_eq!(Error::from(ClaimsError::MissingSubject).status_code(), 401);
        assert_eq!(Error::from(LookupError::NotFound).status_code(), 404);
        assert_eq!(Error::Config("CLIENT_ID not set".into()).status_code(), 500);
    }

    #[test]
    fn test_claims_error_passes_through_lookup_unchanged() {
        let inner = ClaimsError::MalformedEvent("requestContext".into());
        let wrapped = LookupError::from(ClaimsError::MalformedEvent("requestContext".into()));
        assert_eq!(wrapped.to_string(), inner.to_string());
    }
}
