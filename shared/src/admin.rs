//! Admin-level Cognito user management.

use aws_sdk_cognitoidentityprovider::operation::admin_create_user::AdminCreateUserError;
use aws_sdk_cognitoidentityprovider::operation::admin_set_user_password::AdminSetUserPasswordError;
use aws_sdk_cognitoidentityprovider::operation::admin_update_user_attributes::AdminUpdateUserAttributesError;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Result of admin user creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreated {
    pub username: String,
    pub status: Option<String>,
}

/// Admin operations against the Cognito user pool.
///
/// Usernames are email addresses in this pool; `admin_create_user` mirrors
/// the username into the `email` attribute.
#[derive(Debug, Clone)]
pub struct AdminGateway {
    client: Client,
    config: AuthConfig,
}

impl AdminGateway {
    pub fn new(client: Client, config: AuthConfig) -> Self {
        Self { client, config }
    }

    /// Create an account with the configured temporary password. The welcome
    /// notification is suppressed; callers deliver credentials themselves.
    pub async fn admin_create_user(&self, username: &str) -> Result<UserCreated, AuthError> {
        require_username(username)?;

        let response = self
            .client
            .admin_create_user()
            .user_pool_id(&self.config.user_pool_id)
            .username(username)
            .user_attributes(attribute("email", username)?)
            .temporary_password(&self.config.temporary_password)
            .message_action(MessageActionType::Suppress)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "admin user creation failed");
                match e.as_service_error() {
                    Some(service) => classify_create_error(service),
                    None => AuthError::ProviderUnavailable(e.to_string()),
                }
            })?;

        let user = response.user();
        Ok(UserCreated {
            username: user
                .and_then(|u| u.username())
                .unwrap_or(username)
                .to_string(),
            status: user
                .and_then(|u| u.user_status())
                .map(|s| s.as_str().to_string()),
        })
    }

    /// Set a permanent password, bypassing the temporary-password flow.
    pub async fn admin_set_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        require_username(username)?;

        self.client
            .admin_set_user_password()
            .user_pool_id(&self.config.user_pool_id)
            .username(username)
            .password(password)
            .permanent(true)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "admin password set failed");
                match e.as_service_error() {
                    Some(service) => classify_set_password_error(service),
                    None => AuthError::ProviderUnavailable(e.to_string()),
                }
            })?;

        Ok(())
    }

    /// Mark the user's email attribute as verified.
    pub async fn admin_verify_email(&self, username: &str) -> Result<(), AuthError> {
        require_username(username)?;

        self.client
            .admin_update_user_attributes()
            .user_pool_id(&self.config.user_pool_id)
            .username(username)
            .user_attributes(attribute("email_verified", "true")?)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "admin attribute update failed");
                match e.as_service_error() {
                    Some(service) => classify_update_error(service),
                    None => AuthError::ProviderUnavailable(e.to_string()),
                }
            })?;

        Ok(())
    }

    /// Fully provision a user: create, set the permanent password, verify
    /// the email. Stops at the first failure; no rollback of earlier steps.
    pub async fn provision_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserCreated, AuthError> {
        let created = self.admin_create_user(username).await?;
        self.admin_set_password(username, password).await?;
        self.admin_verify_email(username).await?;
        info!(username, "provisioned user");
        Ok(created)
    }
}

fn require_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::UserNotFound);
    }
    Ok(())
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, AuthError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))
}

fn classify_create_error(err: &AdminCreateUserError) -> AuthError {
    match err {
        AdminCreateUserError::UsernameExistsException(_) => AuthError::UserExists,
        AdminCreateUserError::InvalidPasswordException(e) => AuthError::PolicyViolation(
            e.message().unwrap_or("password rejected").to_string(),
        ),
        _ => AuthError::ProviderUnavailable(err.to_string()),
    }
}

fn classify_set_password_error(err: &AdminSetUserPasswordError) -> AuthError {
    match err {
        AdminSetUserPasswordError::UserNotFoundException(_) => AuthError::UserNotFound,
        AdminSetUserPasswordError::InvalidPasswordException(e) => AuthError::PolicyViolation(
            e.message().unwrap_or("password rejected").to_string(),
        ),
        _ => AuthError::ProviderUnavailable(err.to_string()),
    }
}

fn classify_update_error(err: &AdminUpdateUserAttributesError) -> AuthError {
    match err {
        AdminUpdateUserAttributesError::UserNotFoundException(_) => AuthError::UserNotFound,
        _ => AuthError::ProviderUnavailable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::types::error::{
        InvalidPasswordException, UserNotFoundException, UsernameExistsException,
    };

    #[test]
    fn test_create_error_classification() {
        let err = AdminCreateUserError::UsernameExistsException(
            UsernameExistsException::builder().build(),
        );
        assert!(matches!(classify_create_error(&err), AuthError::UserExists));
    }

    #[test]
    fn test_set_password_error_classification() {
        let err = AdminSetUserPasswordError::UserNotFoundException(
            UserNotFoundException::builder().build(),
        );
        assert!(matches!(
            classify_set_password_error(&err),
            AuthError::UserNotFound
        ));

        let err = AdminSetUserPasswordError::InvalidPasswordException(
            InvalidPasswordException::builder()
                .message("Password must contain a symbol")
                .build(),
        );
        match classify_set_password_error(&err) {
            AuthError::PolicyViolation(msg) => {
                assert_eq!(msg, "Password must contain a symbol")
            }
            other => panic!("expected PolicyViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_username_rejected() {
        assert!(matches!(
            require_username("").unwrap_err(),
            AuthError::UserNotFound
        ));
        assert!(require_username("alice@example.com").is_ok());
    }
}
