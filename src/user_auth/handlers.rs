use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_cookies::cookie::time::Duration as CookieDuration;
use tower_cookies::{Cookie, Cookies};
use utoipa::ToSchema;

use super::error::AuthError;
use super::issuer::SessionClaims;
use crate::account::SignupResult;
use crate::gateway::state::AppState;
use crate::response::{ErrorKind, ResponseData};

/// Name of the session cookie
pub const USER_TOKEN_COOKIE: &str = "userToken";

/// Signup request body
///
/// Documentation only: handlers read the raw JSON object so that absent and
/// blank fields are reported together.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email_address: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "password123")]
    pub confirm_password: String,
}

/// Signin request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    #[schema(example = "ada@example.com")]
    pub email_address: String,
    #[schema(example = "password123")]
    pub password: String,
}

fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(USER_TOKEN_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_max_age(CookieDuration::seconds(max_age_secs));
    cookie.set_secure(secure);
    cookie
}

/// Drop the session cookie on the client
pub(crate) fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(USER_TOKEN_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}

/// Field set of a request body. Unparseable bodies and non-objects are empty,
/// so the caller gets the missing-fields envelope.
fn body_fields(body: Result<Json<Value>, JsonRejection>) -> Map<String, Value> {
    match body {
        Ok(Json(Value::Object(map))) => map,
        Ok(_) => Map::new(),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Request body is not JSON");
            Map::new()
        }
    }
}

/// Register a new account
///
/// POST /{api_prefix}/users/signup
#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = ResponseData<SignupResult>),
        (status = 400, description = "Missing fields, password mismatch, invalid or taken email"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Users"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ResponseData<SignupResult>, AuthError> {
    let session = state.user_auth.signup(&body_fields(body)).await?;

    cookies.add(session_cookie(
        session.token,
        state.user_auth.issuer().ttl().num_seconds(),
        state.secure_cookie,
    ));

    Ok(ResponseData::success(session.result)
        .with_code(StatusCode::CREATED)
        .with_message("Account created"))
}

/// Sign in with email and password
///
/// POST /{api_prefix}/users/signin
#[utoipa::path(
    post,
    path = "/users/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = ResponseData<SessionClaims>),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Users"
)]
pub async fn signin(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ResponseData<SessionClaims>, AuthError> {
    let session = state.user_auth.signin(&body_fields(body)).await?;

    cookies.add(session_cookie(
        session.token,
        state.user_auth.issuer().ttl().num_seconds(),
        state.secure_cookie,
    ));

    Ok(ResponseData::success(session.result).with_code(StatusCode::OK))
}

/// Identity of the current session
///
/// GET /{api_prefix}/users/me
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current session identity", body = ResponseData<SessionClaims>),
        (status = 401, description = "Missing, invalid or expired session")
    ),
    tag = "Users"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Extension(claims): Extension<SessionClaims>,
) -> Result<ResponseData<SessionClaims>, AuthError> {
    match state.user_auth.me(&claims).await {
        Ok(current) => Ok(ResponseData::success(current).with_code(StatusCode::OK)),
        Err(err) => {
            // Account gone or deactivated: the session is dead too
            if err.kind() == ErrorKind::Credential {
                clear_session_cookie(&cookies);
            }
            Err(err)
        }
    }
}

/// End the current session
///
/// POST /{api_prefix}/users/signout
#[utoipa::path(
    post,
    path = "/users/signout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "Users"
)]
pub async fn signout(cookies: Cookies) -> ResponseData<()> {
    clear_session_cookie(&cookies);
    ResponseData::success(())
        .with_code(StatusCode::OK)
        .with_message("Signed out")
}
