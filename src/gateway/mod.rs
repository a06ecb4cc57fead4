pub mod health;
pub mod openapi;
pub mod state;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use axum::http::Method;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db::Database;
use crate::user_auth::{CredentialIssuer, UserAuthService, handlers, middleware};
use state::AppState;

/// Build the application router.
///
/// `api_prefix` is the path segment every API route lives under (e.g. "api").
pub fn build_router(state: Arc<AppState>, api_prefix: &str) -> Router {
    let prefix = match api_prefix.trim_matches('/') {
        "" => String::new(),
        p => format!("/{}", p),
    };

    // ==========================================================================
    // Session-gated user routes
    // ==========================================================================
    let session_routes = Router::new()
        .route("/me", get(handlers::me))
        .layer(from_fn_with_state(state.clone(), middleware::session_gate));

    // ==========================================================================
    // Public user routes
    // ==========================================================================
    let user_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/signout", post(handlers::signout))
        .merge(session_routes);

    Router::new()
        .route(&format!("{}/health", prefix), get(health::health_check))
        .nest(&format!("{}/users", prefix), user_routes)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::api_doc(api_prefix)))
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Browser clients send the session cookie cross-origin, so the caller's
/// origin is echoed back with credentials allowed.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Wire services from config and start the HTTP server
pub async fn run_server(config: &AppConfig, db: Database) -> std::io::Result<()> {
    let db = Arc::new(db);
    let issuer = CredentialIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
    let user_auth = Arc::new(UserAuthService::new(db.clone(), issuer));
    let state = Arc::new(AppState::new(db, user_auth, config.auth.secure_cookie));

    let app = build_router(state, &config.gateway.api_prefix);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            addr = %addr,
            error = %e,
            "Failed to bind; port {} may already be in use",
            config.gateway.port
        );
        e
    })?;

    tracing::info!(addr = %addr, "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);
    tracing::info!(
        "User API: /{}/users/* (signup, signin, signout, me)",
        config.gateway.api_prefix
    );

    axum::serve(listener, app).await
}
