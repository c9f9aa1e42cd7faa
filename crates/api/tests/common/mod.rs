//! Shared fixtures for the HTTP integration tests.
//!
//! The app runs against the in-memory gateway and storage, so no database or
//! hosted backend is needed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use domain::services::{
    AuthSession, Identity, IdentityProvider, InMemoryGateway, InMemoryStorage, SessionError,
};
use green_life_expo_api::{
    app::{create_app, AppState},
    config::{
        BackendConfig, BackendKind, Config, DatabaseConfig, FormsConfig, JwtAuthConfig,
        LoggingConfig, SecurityConfig, ServerConfig, UploadsConfig,
    },
    services::Backend,
};
use serde_json::{json, Value};
use shared::jwt::JwtConfig;

pub const JWT_SECRET: &str = "test-jwt-secret-with-enough-length-0123456789";
pub const ADMIN_EMAIL: &str = "admin@greenlifeexpo.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            max_body_size: 3_145_728,
            login_path: "/admin/login".to_string(),
        },
        backend: BackendConfig {
            kind: BackendKind::Rest,
            url: "http://backend.test".to_string(),
            anon_key: "anon-key".to_string(),
            table_suffix: String::new(),
            timeout_ms: 1000,
        },
        database: DatabaseConfig::default(),
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0,
            hsts_enabled: false,
            trust_forwarded_for: false,
        },
        jwt: JwtAuthConfig {
            secret: JWT_SECRET.to_string(),
            audience: "authenticated".to_string(),
            leeway_secs: 0,
        },
        forms: FormsConfig::default(),
        uploads: UploadsConfig::default(),
    }
}

/// Identity provider that accepts one fixed account.
#[derive(Default)]
pub struct FakeIdentity {
    pub signed_out: Mutex<Vec<String>>,
    pub unavailable: bool,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError> {
        if self.unavailable {
            return Err(SessionError::Provider("Service unavailable".into()));
        }
        if email != ADMIN_EMAIL || password != ADMIN_PASSWORD {
            return Err(SessionError::InvalidCredentials);
        }
        Ok(AuthSession {
            access_token: admin_token(),
            refresh_token: Some("refresh".into()),
            expires_in: 3600,
            identity: admin_identity(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

pub fn admin_identity() -> Identity {
    Identity {
        user_id: "0b6f7d1e-admin".to_string(),
        email: Some(ADMIN_EMAIL.to_string()),
        role: Some("authenticated".to_string()),
    }
}

fn jwt() -> JwtConfig {
    JwtConfig::new(JWT_SECRET, Some("authenticated".to_string())).unwrap()
}

/// A valid session token for the test admin.
pub fn admin_token() -> String {
    jwt()
        .issue_token("0b6f7d1e-admin", Some(ADMIN_EMAIL), 3600)
        .unwrap()
}

pub fn expired_token() -> String {
    jwt()
        .issue_token("0b6f7d1e-admin", Some(ADMIN_EMAIL), -120)
        .unwrap()
}

/// An app wired to in-memory collaborators the test can inspect.
pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<InMemoryGateway>,
    pub storage: Arc<InMemoryStorage>,
    pub identity: Arc<FakeIdentity>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, FakeIdentity::default())
    }

    pub fn build(config: Config, identity: FakeIdentity) -> Self {
        let gateway = Arc::new(seeded_gateway());
        let storage = Arc::new(InMemoryStorage::new());
        let identity = Arc::new(identity);
        let backend = Backend::new(gateway.clone(), storage.clone());
        let state = AppState::new(config, backend, identity.clone()).unwrap();
        Self {
            router: create_app(state),
            gateway,
            storage,
            identity,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn admin_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn admin_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub fn seeded_gateway() -> InMemoryGateway {
    InMemoryGateway::new()
        .with_rows(
            "site_settings",
            vec![
                json!({"id": "s1", "category": "general", "setting_key": "site_name", "setting_value": "Green Life Expo"}),
                json!({"id": "s2", "category": "hero", "setting_key": "hero_title", "setting_value": "Welcome to Green Life Expo"}),
                json!({"id": "s3", "category": "contact", "setting_key": "email", "setting_value": "info@greenlifeexpo.com"}),
                json!({"id": "s4", "category": "colors", "setting_key": "primary_color", "setting_value": "130 45% 30%"}),
                json!({"id": "s5", "category": "colors", "setting_key": "accent_color", "setting_value": "45 90% 55%"}),
                json!({"id": "s6", "category": "branding", "setting_key": "logo_url", "setting_value": ""}),
                json!({"id": "s7", "category": "seo", "setting_key": "meta_title", "setting_value": "Green Life Expo 2025"}),
                json!({"id": "s8", "category": "seo", "setting_key": "og_image", "setting_value": ""}),
            ],
        )
        .with_rows(
            "page_content",
            vec![
                json!({"id": "c1", "page_name": "home", "section_name": "hero", "content_key": "hero_title", "content_value": "Sustainable living", "display_order": 1}),
                json!({"id": "c2", "page_name": "home", "section_name": "hero", "content_key": "hero_subtitle", "content_value": "Cairo, 2025", "display_order": 2}),
                json!({"id": "c3", "page_name": "about", "section_name": "mission", "content_key": "mission_paragraph", "content_value": "We bring green businesses together.", "display_order": 1}),
            ],
        )
        .with_rows(
            "packages",
            vec![
                json!({"id": "p1", "package_type": "exhibitor", "name": "Standard Booth", "price": "EGP 15,000", "features": ["9 sqm"], "display_order": 1, "is_active": true}),
                json!({"id": "p2", "package_type": "exhibitor", "name": "Premium Booth", "price": "EGP 25,000", "features": ["18 sqm"], "is_popular": true, "display_order": 2, "is_active": true}),
                json!({"id": "p3", "package_type": "sponsor", "name": "Gold", "price": "EGP 100,000", "display_order": 1, "is_active": true}),
                json!({"id": "p4", "package_type": "sponsor", "name": "Retired", "price": "EGP 1", "display_order": 9, "is_active": false}),
            ],
        )
        .with_rows(
            "faqs",
            vec![
                json!({"id": "f1", "question": "Where is the venue?", "answer": "Cairo", "category": "general", "display_order": 1, "is_active": true}),
                json!({"id": "f2", "question": "Is parking free?", "answer": "Yes", "category": "visitors", "display_order": 2, "is_active": false}),
            ],
        )
        .with_rows(
            "contact_submissions",
            vec![
                json!({"id": "m1", "name": "Amira", "email": "amira@example.com", "message": "Booth sizes?", "submission_type": "exhibitor", "status": "new", "created_at": "2025-01-02T10:00:00Z"}),
                json!({"id": "m2", "name": "Omar", "email": "omar@example.com", "message": "Hello", "submission_type": "contact", "status": "read", "created_at": "2025-01-03T10:00:00Z"}),
            ],
        )
}
