//! Admin session context.
//!
//! Sign-in is delegated to an external identity provider. A verified session
//! becomes an [`AdminContext`] that is handed to every admin operation
//! explicitly; nothing here is global.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Tokens returned by a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub identity: Identity,
}

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError>;
}

/// Per-request admin context.
#[derive(Debug, Clone)]
pub struct AdminContext {
    identity: Identity,
    access_token: String,
}

impl AdminContext {
    pub fn new(identity: Identity, access_token: impl Into<String>) -> Self {
        Self {
            identity,
            access_token: access_token.into(),
        }
    }

    pub fn current_user(&self) -> &Identity {
        &self.identity
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Ends the session with the provider. The context is consumed.
    pub async fn sign_out(self, provider: &dyn IdentityProvider) -> Result<(), SessionError> {
        provider.sign_out(&self.access_token).await?;
        tracing::info!(user_id = %self.identity.user_id, "Admin signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        signed_out: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError> {
            if password != "secret" {
                return Err(SessionError::InvalidCredentials);
            }
            Ok(AuthSession {
                access_token: "token".to_string(),
                refresh_token: None,
                expires_in: 3600,
                identity: Identity {
                    user_id: "u1".to_string(),
                    email: Some(email.to_string()),
                    role: Some("authenticated".to_string()),
                },
            })
        }

        async fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
            self.signed_out.lock().unwrap().push(access_token.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let provider = FakeProvider::default();
        let session = provider.sign_in("admin@expo.example", "secret").await.unwrap();
        let context = AdminContext::new(session.identity, session.access_token);

        assert_eq!(context.current_user().user_id, "u1");
        context.sign_out(&provider).await.unwrap();
        assert_eq!(*provider.signed_out.lock().unwrap(), vec!["token".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let provider = FakeProvider::default();
        assert!(matches!(
            provider.sign_in("admin@expo.example", "wrong").await,
            Err(SessionError::InvalidCredentials)
        ));
    }
}
