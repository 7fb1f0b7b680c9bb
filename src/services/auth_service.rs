//! Domain service for authentication and user management.
//!
//! Handles registration, login, password changes, and API key management.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Role;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Role '{0}' cannot be self-assigned")]
    RoleNotAllowed(Role),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::db::User> for UserInfo {
    fn from(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Login result containing user info and API key.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub email: String,
    pub role: Role,
    pub api_key: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] for a registered email and
    /// [`AuthError::RoleNotAllowed`] when `role` is above `viewer` and the
    /// caller is not trusted to grant it.
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
        trusted: bool,
    ) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and returns user info.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Verifies an API key and returns the associated user if valid.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError>;

    /// Gets information for a specific user.
    async fn get_user_info(&self, email: &str) -> Result<UserInfo, AuthError>;

    /// Changes a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if current password is incorrect or new password invalid.
    async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Gets the current API key for a user.
    async fn get_api_key(&self, email: &str) -> Result<String, AuthError>;

    /// Regenerates the API key for a user and returns the new one.
    async fn regenerate_api_key(&self, email: &str) -> Result<String, AuthError>;
}
