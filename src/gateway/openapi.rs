//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:3000/docs`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`
//!
//! Paths are documented relative to the API prefix; [`api_doc`] sets the
//! prefix as the server base path.

use utoipa::openapi::Server;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::SignupResult;
use crate::gateway::health::HealthResponse;
use crate::user_auth::SessionClaims;
use crate::user_auth::handlers::{SigninRequest, SignupRequest};

/// Session cookie security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    crate::user_auth::handlers::USER_TOKEN_COOKIE,
                    "HS256 session token, set by signup and signin",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Userbase Account API",
        version = "1.0.0",
        description = "Account signup, signin and cookie sessions.",
        license(
            name = "MIT"
        )
    ),
    paths(
        crate::gateway::health::health_check,
        crate::user_auth::handlers::signup,
        crate::user_auth::handlers::signin,
        crate::user_auth::handlers::me,
        crate::user_auth::handlers::signout,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            SigninRequest,
            SignupResult,
            SessionClaims,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Signup, signin and sessions"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

/// Document with the server base path set to `/{api_prefix}`
pub fn api_doc(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(format!(
        "/{}",
        api_prefix.trim_matches('/')
    ))]);
    doc
}
