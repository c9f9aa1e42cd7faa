//! Admin session extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::services::AdminContext;

use crate::error::ApiError;

/// The signed-in admin of the current request.
///
/// Inserted by [`require_admin`](crate::middleware::require_admin); handlers
/// outside that layer are rejected with 401.
#[derive(Debug, Clone)]
pub struct Admin(pub AdminContext);

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminContext>()
            .cloned()
            .map(Admin)
            .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use domain::services::Identity;

    #[tokio::test]
    async fn test_admin_from_extensions() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(AdminContext::new(
            Identity {
                user_id: "user-1".into(),
                email: Some("admin@greenlifeexpo.com".into()),
                role: None,
            },
            "token",
        ));

        let Admin(ctx) = Admin::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.current_user().user_id, "user-1");
        assert_eq!(ctx.access_token(), "token");
    }

    #[tokio::test]
    async fn test_admin_missing() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = Admin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
