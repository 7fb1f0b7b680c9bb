use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{
    ApiError, ApiKeyResponse, ApiResponse, AppState, ChangePasswordRequest, LoginRequest,
    MessageResponse, RegisterRequest,
};
use crate::domain::Role;
use crate::services::{AuthError, LoginResult, UserInfo};

const SESSION_USER_KEY: &str = "user";

/// The authenticated caller, placed in request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Fails with `403` unless the caller holds one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.role.is_one_of(allowed) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Role '{}' is not permitted to perform this action",
                self.role
            )))
        }
    }
}

impl From<UserInfo> for CurrentUser {
    fn from(user: UserInfo) -> Self {
        Self {
            email: user.email,
            role: user.role,
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = resolve_user(&state, &session, &headers).await? else {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    };

    tracing::Span::current().record("user_id", user.email.as_str());
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn resolve_user(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
) -> Result<Option<CurrentUser>, ApiError> {
    // Role is re-read on every request so demotions take effect immediately.
    if let Ok(Some(email)) = session.get::<String>(SESSION_USER_KEY).await {
        match state.auth_service().get_user_info(&email).await {
            Ok(user) => return Ok(Some(user.into())),
            Err(AuthError::UserNotFound) => {
                let _ = session.flush().await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(key) = extract_api_key(headers) {
        let user = state.auth_service().verify_api_key(&key).await?;
        return Ok(user.map(CurrentUser::from));
    }

    Ok(None)
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Open registration creates viewers; an authenticated admin may grant any role.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let trusted = resolve_user(&state, &session, &headers)
        .await?
        .is_some_and(|caller| caller.role.is_one_of(Role::ADMINS));

    let user = state
        .auth_service()
        .register(&payload.email, &payload.password, payload.role, trusted)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Authenticate with email and password, returns API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    if let Err(e) = session.insert(SESSION_USER_KEY, &result.email).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    tracing::info!(email = %result.email, "User logged in");
    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse::new("Logged out")))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let info = state.auth_service().get_user_info(&user.email).await?;
    Ok(Json(ApiResponse::success(info)))
}

/// PUT /auth/password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(
            &user.email,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    tracing::info!(email = %user.email, "Password changed");

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// GET /auth/api-key
pub async fn get_api_key(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth_service().get_api_key(&user.email).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

/// POST /auth/api-key/regenerate
/// Generate a new random API key
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state.auth_service().regenerate_api_key(&user.email).await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn api_key_header_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", HeaderValue::from_static("abc"));
        headers.insert("Authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn bearer_token_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer  xyz "));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("xyz"));

        headers.insert("Authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_api_key(&headers), None);
    }

    #[test]
    fn role_gate() {
        let staff = CurrentUser {
            email: "s@example.com".to_string(),
            role: Role::Staff,
        };
        assert!(staff.require(Role::WRITERS).is_ok());
        assert!(matches!(
            staff.require(Role::ADMINS),
            Err(ApiError::Forbidden(_))
        ));
    }
}
