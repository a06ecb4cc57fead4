//! Data models for user accounts

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account row (`users` table), joined with its profile id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    /// Stored digest, never the plaintext. `None` until a password is set.
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_digest: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Id of the account's profile, `None` only for rows created outside signup
    pub profile_id: Option<i64>,
}

/// Input to the signup write path
#[derive(Clone, Deserialize)]
pub struct SignupParams {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for SignupParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupParams")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email_address", &self.email_address)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identity of a freshly registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignupResult {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub profile_id: i64,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email_address: String,
}
