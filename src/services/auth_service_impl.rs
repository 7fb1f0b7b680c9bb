//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::domain::Role;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, UserInfo};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn check_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

fn check_email(email: &str) -> Result<(), AuthError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));

    if valid && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(AuthError::Validation(format!("Invalid email address: '{email}'")))
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
        trusted: bool,
    ) -> Result<UserInfo, AuthError> {
        let email = email.trim().to_lowercase();
        check_email(&email)?;
        self.check_password(password)?;

        if role != Role::Viewer && !trusted {
            return Err(AuthError::RoleNotAllowed(role));
        }

        let user = self
            .store
            .create_user(&email, password, role, &self.security)
            .await?
            .ok_or_else(|| AuthError::EmailTaken(email.clone()))?;

        info!(email = %user.email, role = %user.role, "Registered user");
        Ok(user.into())
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = email.trim().to_lowercase();

        let is_valid = self.store.verify_user_password(&email, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            email: user.email,
            role: user.role,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(UserInfo::from))
    }

    async fn get_user_info(&self, email: &str) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.check_password(new_password)?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(email, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(email, new_password, &self.security)
            .await?;

        Ok(())
    }

    async fn get_api_key(&self, email: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.api_key)
    }

    async fn regenerate_api_key(&self, email: &str) -> Result<String, AuthError> {
        let new_api_key = self.store.regenerate_user_api_key(email).await?;
        info!(email, "Regenerated API key");
        Ok(new_api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmAuthService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        SeaOrmAuthService::new(store, security)
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(check_email("a@b.co").is_ok());
        assert!(check_email("nobody").is_err());
        assert!(check_email("@b.co").is_err());
        assert!(check_email("a b@c.io").is_err());
    }

    #[tokio::test]
    async fn register_then_login() {
        let auth = service().await;
        let user = auth
            .register("Clerk@Shop.io", "longenough", Role::Viewer, false)
            .await
            .unwrap();
        assert_eq!(user.email, "clerk@shop.io");

        let login = auth.login("clerk@shop.io", "longenough").await.unwrap();
        assert_eq!(login.role, Role::Viewer);
        assert_eq!(login.api_key.len(), 64);

        assert!(matches!(
            auth.login("clerk@shop.io", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = service().await;
        auth.register("a@b.co", "longenough", Role::Viewer, false)
            .await
            .unwrap();
        assert!(matches!(
            auth.register("A@B.co", "longenough", Role::Viewer, false).await,
            Err(AuthError::EmailTaken(_))
        ));
    }

    #[tokio::test]
    async fn untrusted_caller_cannot_self_assign_staff() {
        let auth = service().await;
        assert!(matches!(
            auth.register("a@b.co", "longenough", Role::Staff, false).await,
            Err(AuthError::RoleNotAllowed(Role::Staff))
        ));
        let staff = auth
            .register("a@b.co", "longenough", Role::Staff, true)
            .await
            .unwrap();
        assert_eq!(staff.role, Role::Staff);
    }

    #[tokio::test]
    async fn change_password_requires_current_one() {
        let auth = service().await;
        auth.register("a@b.co", "longenough", Role::Viewer, false)
            .await
            .unwrap();

        assert!(matches!(
            auth.change_password("a@b.co", "not-it", "brand-new-pass").await,
            Err(AuthError::Validation(_))
        ));
        auth.change_password("a@b.co", "longenough", "brand-new-pass")
            .await
            .unwrap();
        assert!(auth.login("a@b.co", "brand-new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn regenerated_key_replaces_old_one() {
        let auth = service().await;
        let old = auth.get_api_key("admin@example.com").await.unwrap();
        let new = auth.regenerate_api_key("admin@example.com").await.unwrap();

        assert_ne!(old, new);
        assert!(auth.verify_api_key(&old).await.unwrap().is_none());
        assert_eq!(
            auth.verify_api_key(&new).await.unwrap().unwrap().role,
            Role::Admin
        );
    }
}
