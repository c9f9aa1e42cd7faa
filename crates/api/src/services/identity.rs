//! Client for the hosted identity provider.
//!
//! Password sign-in goes to `/auth/v1/token?grant_type=password` and sign-out
//! to `/auth/v1/logout`. The provider answers sign-in with a session whose
//! access token is the HS256 JWT checked by the admin middleware.

use std::time::Duration;

use async_trait::async_trait;
use domain::services::{AuthSession, Identity, IdentityProvider, SessionError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::BackendConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Error body; the provider has used several field names over time.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self, status: StatusCode) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .unwrap_or_else(|| format!("identity provider returned {}", status))
    }
}

/// Identity provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &BackendConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        response
            .json::<ProviderErrorBody>()
            .await
            .unwrap_or_default()
            .into_message(status)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let message = Self::error_message(response).await;
            debug!(status = status.as_u16(), message = %message, "Sign-in rejected");
            return Err(SessionError::InvalidCredentials);
        }
        if !status.is_success() {
            let message = Self::error_message(response).await;
            warn!(status = status.as_u16(), message = %message, "Identity provider error");
            return Err(SessionError::Provider(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        info!(user_id = %token.user.id, "Admin signed in");
        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            identity: Identity {
                user_id: token.user.id,
                email: token.user.email,
                role: token.user.role,
            },
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        let status = response.status();
        // An already expired session counts as signed out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(SessionError::Provider(Self::error_message(response).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HttpIdentityProvider {
        HttpIdentityProvider::new(&BackendConfig {
            kind: BackendKind::Rest,
            url: format!("{}/", server.uri()),
            anon_key: "anon-key".to_string(),
            table_suffix: "_20251225".to_string(),
            timeout_ms: 2_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({"email": "admin@greenlifeexpo.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-token",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {"id": "user-1", "email": "admin@greenlifeexpo.com", "role": "authenticated"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = provider(&server)
            .sign_in("admin@greenlifeexpo.com", "pw")
            .await
            .unwrap();
        assert_eq!(session.access_token, "jwt-token");
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.identity.user_id, "user-1");
        assert_eq!(session.identity.role.as_deref(), Some("authenticated"));
    }

    #[tokio::test]
    async fn test_sign_in_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let result = provider(&server).sign_in("admin@example.com", "wrong").await;
        assert!(matches!(result, Err(SessionError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_in_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"msg": "maintenance"})))
            .mount(&server)
            .await;

        match provider(&server).sign_in("admin@example.com", "pw").await {
            Err(SessionError::Provider(msg)) => assert_eq!(msg, "maintenance"),
            other => panic!("Expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_out_sends_user_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server).sign_out("user-token").await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_out_expired_session_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(provider(&server).sign_out("expired").await.is_ok());
    }
}
