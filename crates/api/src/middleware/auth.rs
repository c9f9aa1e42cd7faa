//! Authentication middleware.
//!
//! Admin routes require the provider session token as a bearer token. A
//! verified token becomes an [`AdminContext`] in the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use domain::services::{AdminContext, Identity};
use serde_json::json;
use shared::jwt::JwtError;

use crate::app::AppState;

/// Extracts the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Middleware that requires a valid admin session.
///
/// Browsers (clients accepting `text/html`) are redirected to the login view
/// instead of receiving a 401 body.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let wants_html = accepts_html(req.headers());

    let token = match bearer_token(req.headers()) {
        Some(token) => token,
        None => {
            return unauthenticated(wants_html, &state.config.server.login_path, "Missing session token");
        }
    };

    match state.jwt.validate_token(&token) {
        Ok(claims) => {
            let identity = Identity {
                user_id: claims.sub,
                email: claims.email,
                role: claims.role,
            };
            tracing::debug!(user_id = %identity.user_id, "Admin session verified");
            req.extensions_mut().insert(AdminContext::new(identity, token));
            next.run(req).await
        }
        Err(e) => {
            let message = match e {
                JwtError::TokenExpired => "Session expired",
                _ => "Invalid session token",
            };
            tracing::debug!(error = %e, "Rejected admin session");
            unauthenticated(wants_html, &state.config.server.login_path, message)
        }
    }
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

fn unauthenticated(wants_html: bool, login_path: &str, message: &str) -> Response {
    if wants_html {
        Redirect::to(login_path).into_response()
    } else {
        unauthorized_response(message)
    }
}

/// Helper to create unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Missing session token");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_browser_is_redirected() {
        let response = unauthenticated(true, "/admin/login", "Missing session token");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/login");
    }

    #[test]
    fn test_accepts_html() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_html(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(!accepts_html(&headers));

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        assert!(accepts_html(&headers));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }
}
