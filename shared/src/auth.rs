//! Cognito user authentication: secret hash, login, and password reset.

use aws_sdk_cognitoidentityprovider::operation::confirm_forgot_password::ConfirmForgotPasswordError;
use aws_sdk_cognitoidentityprovider::operation::forgot_password::ForgotPasswordError;
use aws_sdk_cognitoidentityprovider::operation::initiate_auth::InitiateAuthError;
use aws_sdk_cognitoidentityprovider::types::AuthFlowType;
use aws_sdk_cognitoidentityprovider::Client;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::warn;

use crate::config::AuthConfig;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Compute the Cognito secret hash for an app client with a client secret.
///
/// base64(HMAC-SHA256(key = client_secret, msg = username + client_id)).
/// Pure function of its inputs; must be recomputed whenever the username
/// changes.
pub fn compute_secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Token bundle returned by a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i32,
}

/// Where the password-reset confirmation code was sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetToken {
    pub destination: Option<String>,
    pub delivery_medium: Option<String>,
}

/// User-facing authentication operations against the Cognito user pool.
///
/// Holds a single shared client handle, constructed once from configuration
/// at process start.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    client: Client,
    config: AuthConfig,
}

impl AuthGateway {
    pub fn new(client: Client, config: AuthConfig) -> Self {
        Self { client, config }
    }

    fn secret_hash(&self, username: &str) -> String {
        compute_secret_hash(username, &self.config.client_id, &self.config.client_secret)
    }

    /// Log a user in with the USER_PASSWORD_AUTH flow.
    pub async fn login(&self, username: &str, password: &str) -> Result<Tokens, AuthError> {
        if username.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let response = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .auth_parameters("SECRET_HASH", self.secret_hash(username))
            .client_id(&self.config.client_id)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "login failed");
                match e.as_service_error() {
                    Some(service) => classify_login_error(service),
                    None => AuthError::ProviderUnavailable(e.to_string()),
                }
            })?;

        let result = response.authentication_result().ok_or_else(|| {
            AuthError::ProviderUnavailable("no authentication result in response".to_string())
        })?;

        Ok(Tokens {
            access_token: required_token(result.access_token(), "access token")?,
            id_token: required_token(result.id_token(), "id token")?,
            refresh_token: required_token(result.refresh_token(), "refresh token")?,
            expires_in: result.expires_in(),
        })
    }

    /// Start a password reset: Cognito dispatches a confirmation code
    /// out of band.
    pub async fn start_password_reset(&self, username: &str) -> Result<ResetToken, AuthError> {
        if username.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        let response = self
            .client
            .forgot_password()
            .client_id(&self.config.client_id)
            .secret_hash(self.secret_hash(username))
            .username(username)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "password reset request failed");
                match e.as_service_error() {
                    Some(service) => classify_reset_error(service),
                    None => AuthError::ProviderUnavailable(e.to_string()),
                }
            })?;

        let delivery = response.code_delivery_details();
        Ok(ResetToken {
            destination: delivery.and_then(|d| d.destination()).map(String::from),
            delivery_medium: delivery
                .and_then(|d| d.delivery_medium())
                .map(|m| m.as_str().to_string()),
        })
    }

    /// Validate the confirmation code and set the new password.
    pub async fn confirm_password_reset(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if username.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        self.client
            .confirm_forgot_password()
            .client_id(&self.config.client_id)
            .secret_hash(self.secret_hash(username))
            .username(username)
            .confirmation_code(code)
            .password(new_password)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "password reset confirmation failed");
                match e.as_service_error() {
                    Some(service) => classify_confirm_error(service),
                    None => AuthError::ProviderUnavailable(e.to_string()),
                }
            })?;

        Ok(())
    }
}

fn required_token(value: Option<&str>, name: &str) -> Result<String, AuthError> {
    value.map(String::from).ok_or_else(|| {
        AuthError::ProviderUnavailable(format!("login response missing {}", name))
    })
}

fn classify_login_error(err: &InitiateAuthError) -> AuthError {
    match err {
        InitiateAuthError::NotAuthorizedException(_) => AuthError::InvalidCredentials,
        InitiateAuthError::UserNotFoundException(_) => AuthError::UserNotFound,
        _ => AuthError::ProviderUnavailable(err.to_string()),
    }
}

fn classify_reset_error(err: &ForgotPasswordError) -> AuthError {
    match err {
        ForgotPasswordError::UserNotFoundException(_) => AuthError::UserNotFound,
        _ => AuthError::ProviderUnavailable(err.to_string()),
    }
}

fn classify_confirm_error(err: &ConfirmForgotPasswordError) -> AuthError {
    match err {
        ConfirmForgotPasswordError::CodeMismatchException(_)
        | ConfirmForgotPasswordError::ExpiredCodeException(_) => AuthError::InvalidCode,
        ConfirmForgotPasswordError::InvalidPasswordException(e) => AuthError::PolicyViolation(
            e.message().unwrap_or("password rejected").to_string(),
        ),
        ConfirmForgotPasswordError::UserNotFoundException(_) => AuthError::UserNotFound,
        _ => AuthError::ProviderUnavailable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::types::error::{
        CodeMismatchException, InvalidPasswordException, NotAuthorizedException,
        UserNotFoundException,
    };

    #[test]
    fn test_secret_hash_known_vector() {
        assert_eq!(
            compute_secret_hash("alice", "client123", "secretXYZ"),
            "e3/awMsXtu87ExJvFOO4hkzRIRQoMP3U0NPJPsVgJHQ="
        );
    }

    #[test]
    fn test_secret_hash_is_deterministic() {
        let a = compute_secret_hash("alice", "client123", "secretXYZ");
        let b = compute_secret_hash("alice", "client123", "secretXYZ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_secret_hash_decodes_to_sha256_digest_length() {
        let hash = compute_secret_hash("alice", "client123", "secretXYZ");
        let raw = BASE64.decode(hash).unwrap();
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn test_secret_hash_changes_with_each_input() {
        let base = compute_secret_hash("alice", "client123", "secretXYZ");
        assert_ne!(base, compute_secret_hash("bob", "client123", "secretXYZ"));
        assert_ne!(base, compute_secret_hash("alice", "client456", "secretXYZ"));
        assert_ne!(base, compute_secret_hash("alice", "client123", "othersecret"));
        // Independently computed vector for a different user
        assert_eq!(
            compute_secret_hash("bob", "client123", "secretXYZ"),
            "bWY0/RNjVySKJumrRtsimExIDyK5O3m3WFFC9jm0ctY="
        );
    }

    #[test]
    fn test_login_error_classification() {
        let err = InitiateAuthError::NotAuthorizedException(
            NotAuthorizedException::builder()
                .message("Incorrect username or password.")
                .build(),
        );
        assert!(matches!(
            classify_login_error(&err),
            AuthError::InvalidCredentials
        ));

        let err = InitiateAuthError::UserNotFoundException(
            UserNotFoundException::builder().build(),
        );
        assert!(matches!(classify_login_error(&err), AuthError::UserNotFound));
    }

    #[test]
    fn test_confirm_error_classification() {
        let err = ConfirmForgotPasswordError::CodeMismatchException(
            CodeMismatchException::builder().build(),
        );
        assert!(matches!(classify_confirm_error(&err), AuthError::InvalidCode));

        let err = ConfirmForgotPasswordError::InvalidPasswordException(
            InvalidPasswordException::builder()
                .message("Password not long enough")
                .build(),
        );
        match classify_confirm_error(&err) {
            AuthError::PolicyViolation(msg) => assert_eq!(msg, "Password not long enough"),
            other => panic!("expected PolicyViolation, got {:?}", other),
        }
    }
}
