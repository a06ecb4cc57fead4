use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_cookies::Cookies;

use super::error::AuthError;
use super::handlers::{USER_TOKEN_COOKIE, clear_session_cookie};
use crate::gateway::state::AppState;

/// Session gate: admits requests carrying a valid `userToken` cookie and
/// exposes its `SessionClaims` as a request extension.
///
/// An expired or invalid token is also removed from the client.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = cookies
        .get(USER_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
    else {
        return AuthError::Unauthorized.into_response();
    };

    match state.user_auth.verify_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(reason = e.name(), "Session token rejected");
            clear_session_cookie(&cookies);
            e.into_response()
        }
    }
}
