//! Admin sign-in, sign-out and session introspection.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::Notice;
use domain::services::{AuthSession, Identity, SessionError};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;
use crate::middleware::metrics::record_admin_login;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session: AuthSession,
    pub notice: Notice,
}

/// POST /api/v1/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    match state.identity.sign_in(&request.email, &request.password).await {
        Ok(session) => {
            record_admin_login("success");
            Ok(Json(LoginResponse {
                session,
                notice: Notice::success("Logged in successfully"),
            }))
        }
        Err(e) => {
            record_admin_login(match e {
                SessionError::InvalidCredentials => "rejected",
                SessionError::Provider(_) => "error",
            });
            Err(e.into())
        }
    }
}

/// POST /api/v1/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<StatusCode, ApiError> {
    admin.sign_out(state.identity.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/me
pub async fn me(Admin(admin): Admin) -> Json<Identity> {
    Json(admin.current_user().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "admin@greenlifeexpo.com".into(),
            password: "secret".into(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = LoginRequest {
            email: "admin".into(),
            password: "secret".into(),
        };
        assert!(bad_email.validate().is_err());

        let no_password = LoginRequest {
            email: "admin@greenlifeexpo.com".into(),
            password: String::new(),
        };
        assert!(no_password.validate().is_err());
    }
}
