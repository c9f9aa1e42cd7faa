use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::IdentityProvider;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    admin_auth, admin_content, admin_dashboard, admin_faqs, admin_packages, admin_settings,
    admin_submissions, admin_uploads, forms, health, site,
};
use crate::services::backend::Backend;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Backend,
    pub identity: Arc<dyn IdentityProvider>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(
        config: Config,
        backend: Backend,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, JwtError> {
        let jwt = JwtConfig::with_leeway(
            &config.jwt.secret,
            config.jwt.audience(),
            config.jwt.leeway_secs,
        )?;

        // Rate limiting is disabled with rate_limit_per_minute = 0
        let rate_limiter = if config.security.rate_limit_per_minute > 0 {
            Some(Arc::new(RateLimiterState::new(
                config.security.rate_limit_per_minute,
            )))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            backend,
            identity,
            jwt: Arc::new(jwt),
            rate_limiter,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/site/settings", get(site::get_settings))
        .route("/api/v1/pages/:page", get(site::get_page))
        .route("/api/v1/packages", get(site::list_packages))
        .route("/api/v1/faqs", get(site::list_faqs))
        .route("/api/v1/admin/login", post(admin_auth::login));

    // Public forms, limited per client IP
    let form_routes = Router::new()
        .route("/api/v1/forms/contact", post(forms::submit_contact))
        .route("/api/v1/forms/exhibitor", post(forms::submit_exhibitor))
        .route("/api/v1/forms/sponsor", post(forms::submit_sponsor))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Admin routes (valid session token required)
    let admin_routes = Router::new()
        .route("/api/v1/admin/logout", post(admin_auth::logout))
        .route("/api/v1/admin/me", get(admin_auth::me))
        .route(
            "/api/v1/admin/settings",
            get(admin_settings::get_settings).put(admin_settings::update_settings),
        )
        .route(
            "/api/v1/admin/seo",
            get(admin_settings::get_seo).put(admin_settings::update_seo),
        )
        .route(
            "/api/v1/admin/branding",
            get(admin_settings::get_branding).put(admin_settings::update_branding),
        )
        .route(
            "/api/v1/admin/design",
            get(admin_settings::get_design).put(admin_settings::update_design),
        )
        .route(
            "/api/v1/admin/content",
            get(admin_content::get_content).put(admin_content::update_content),
        )
        .route(
            "/api/v1/admin/packages",
            get(admin_packages::list_packages).post(admin_packages::create_package),
        )
        .route(
            "/api/v1/admin/packages/:id",
            put(admin_packages::update_package).delete(admin_packages::delete_package),
        )
        .route(
            "/api/v1/admin/faqs",
            get(admin_faqs::list_faqs).post(admin_faqs::create_faq),
        )
        .route(
            "/api/v1/admin/faqs/:id",
            put(admin_faqs::update_faq).delete(admin_faqs::delete_faq),
        )
        .route(
            "/api/v1/admin/submissions",
            get(admin_submissions::list_submissions),
        )
        .route(
            "/api/v1/admin/submissions/:id/read",
            post(admin_submissions::mark_read),
        )
        .route("/api/v1/admin/dashboard", get(admin_dashboard::get_dashboard))
        .route(
            "/api/v1/admin/uploads/:setting_key",
            post(admin_uploads::upload_image),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public_routes)
        .merge(form_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
