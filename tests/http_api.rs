//! Black-box HTTP tests for paths that never reach PostgreSQL.
//!
//! The database pool points at a closed port, so any storage access fails
//! fast with a 500.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD,
    CONTENT_TYPE, COOKIE, ORIGIN, SET_COOKIE,
};
use serde_json::{Value, json};

use userbase::config::DatabaseConfig;
use userbase::db::Database;
use userbase::gateway::{build_router, state::AppState};
use userbase::user_auth::{CredentialIssuer, SessionClaims, UserAuthService};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            acquire_timeout_secs: 1,
            ..DatabaseConfig::default()
        };
        let db = Arc::new(Database::connect_lazy(&config));
        let user_auth = Arc::new(UserAuthService::new(
            db.clone(),
            CredentialIssuer::new(JWT_SECRET, 3600),
        ));
        let app = build_router(Arc::new(AppState::new(db, user_auth, false)), "api");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn claims() -> SessionClaims {
    SessionClaims {
        id: 7,
        profile_id: 8,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email_address: "ada@example.com".to_string(),
    }
}

fn set_cookie_headers(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn clears_user_token(set_cookies: &[String]) -> bool {
    set_cookies
        .iter()
        .any(|c| c.starts_with("userToken=") && c.contains("Max-Age=0"))
}

#[tokio::test]
async fn signup_reports_every_missing_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signup"))
        .json(&json!({ "first_name": "Ada", "last_name": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], false);
    assert_eq!(body["code"], 400);
    assert_eq!(body["error"], "MISSING_FIELDS");
    assert_eq!(
        body["message"],
        "Fields last_name, email_address, password, confirm_password are missing"
    );
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn signup_password_mismatch_is_rejected_before_storage() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signup"))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email_address": "ada@example.com",
            "password": "secret",
            "confirm_password": "different",
        }))
        .send()
        .await
        .unwrap();

    // A storage attempt would have produced a 500
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie_headers(&res).is_empty());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Passwords do not match");
}

#[tokio::test]
async fn signup_overlong_name_is_rejected_before_storage() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signup"))
        .json(&json!({
            "first_name": "A".repeat(101),
            "last_name": "Lovelace",
            "email_address": "ada@example.com",
            "password": "secret",
            "confirm_password": "secret",
        }))
        .send()
        .await
        .unwrap();

    // A storage attempt would have produced a 500
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "FIELD_TOO_LONG");
    assert_eq!(body["message"], "first_name must be at most 100 characters");
}

#[tokio::test]
async fn signup_overlong_email_is_rejected_before_storage() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signup"))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email_address": format!("{}@example.com", "a".repeat(250)),
            "password": "secret",
            "confirm_password": "secret",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "FIELD_TOO_LONG");
}

#[tokio::test]
async fn unparseable_body_gets_missing_fields_envelope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let plain_text = client
        .post(srv.url("/users/signin"))
        .header(CONTENT_TYPE, "text/plain")
        .body("email_address=ada@example.com")
        .send()
        .await
        .unwrap();
    let broken_json = client
        .post(srv.url("/users/signup"))
        .header(CONTENT_TYPE, "application/json")
        .body("{\"first_name\": ")
        .send()
        .await
        .unwrap();

    for res in [plain_text, broken_json] {
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], false);
        assert_eq!(body["error"], "MISSING_FIELDS");
    }
}

#[tokio::test]
async fn signin_requires_email_and_password() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signin"))
        .json(&json!({ "email_address": "ada@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Fields password are missing");
}

#[tokio::test]
async fn signup_storage_failure_is_generic_500() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signup"))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email_address": "ada@example.com",
            "password": "secret",
            "confirm_password": "secret",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(set_cookie_headers(&res).is_empty());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], false);
    assert_eq!(body["message"], "Something went wrong. Please try again later.");
}

#[tokio::test]
async fn me_without_cookie_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/users/me")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "You are unauthorized.");
}

#[tokio::test]
async fn me_with_tampered_token_clears_cookie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = CredentialIssuer::new("some-other-secret", 3600)
        .issue(&claims())
        .unwrap();
    let res = client
        .get(srv.url("/users/me"))
        .header(COOKIE, format!("userToken={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(clears_user_token(&set_cookie_headers(&res)));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "You are unauthorized.");
}

#[tokio::test]
async fn me_with_expired_token_asks_for_relogin() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = CredentialIssuer::new(JWT_SECRET, 3600)
        .issue_at(&claims(), Utc::now() - ChronoDuration::hours(2))
        .unwrap();
    let res = client
        .get(srv.url("/users/me"))
        .header(COOKIE, format!("userToken={}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(clears_user_token(&set_cookie_headers(&res)));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "TOKEN_EXPIRED");
    assert_eq!(body["message"], "Your session has expired. Please re-login.");
}

#[tokio::test]
async fn me_with_valid_token_passes_the_gate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = CredentialIssuer::new(JWT_SECRET, 3600)
        .issue(&claims())
        .unwrap();
    let res = client
        .get(srv.url("/users/me"))
        .header(COOKIE, format!("userToken={}", token))
        .send()
        .await
        .unwrap();

    // Past the gate the handler re-reads the account, which fails offline
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!clears_user_token(&set_cookie_headers(&res)));
}

#[tokio::test]
async fn signout_clears_cookie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/users/signout"))
        .header(COOKIE, "userToken=anything")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(clears_user_token(&set_cookie_headers(&res)));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], true);
}

#[tokio::test]
async fn health_reports_unavailable_without_database() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "unavailable");
}

#[tokio::test]
async fn cross_origin_requests_may_carry_cookies() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let origin = "http://app.example.com";

    let preflight = client
        .request(reqwest::Method::OPTIONS, srv.url("/users/signin"))
        .header(ORIGIN, origin)
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert_eq!(preflight.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], origin);
    assert_eq!(preflight.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let res = client
        .post(srv.url("/users/signout"))
        .header(ORIGIN, origin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], origin);
    assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn openapi_document_uses_api_prefix_as_server() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api-docs/openapi.json", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await.unwrap();
    assert_eq!(doc["servers"][0]["url"], "/api");
    assert!(doc["paths"].get("/users/signup").is_some());
}
