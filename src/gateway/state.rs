use std::sync::Arc;

use crate::db::Database;
use crate::user_auth::UserAuthService;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL pool, for health checks
    pub db: Arc<Database>,
    /// Signup, signin and session checks
    pub user_auth: Arc<UserAuthService>,
    /// Mark the session cookie `Secure`
    pub secure_cookie: bool,
}

impl AppState {
    pub fn new(db: Arc<Database>, user_auth: Arc<UserAuthService>, secure_cookie: bool) -> Self {
        Self {
            db,
            user_auth,
            secure_cookie,
        }
    }
}
