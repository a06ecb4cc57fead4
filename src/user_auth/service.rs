use serde_json::{Map, Value};
use std::sync::Arc;

use super::error::AuthError;
use super::issuer::{CredentialIssuer, SessionClaims};
use crate::account::{AccountRepository, SignupParams, SignupResult};
use crate::db::Database;
use crate::validation::{check_fields, passwords_match};

const SIGNUP_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "email_address",
    "password",
    "confirm_password",
];
const SIGNIN_FIELDS: &[&str] = &["email_address", "password"];

/// Result of a successful signup or signin, with the session token to hand
/// back to the client
#[derive(Debug)]
pub struct Authenticated<T> {
    pub result: T,
    pub token: String,
}

/// Signup, signin and session checks.
///
/// Built once at startup and shared through `AppState`. Each call opens its
/// own repository, so no request shares a connection or transaction.
pub struct UserAuthService {
    db: Arc<Database>,
    issuer: CredentialIssuer,
}

impl UserAuthService {
    pub fn new(db: Arc<Database>, issuer: CredentialIssuer) -> Self {
        Self { db, issuer }
    }

    pub fn issuer(&self) -> &CredentialIssuer {
        &self.issuer
    }

    fn repository(&self) -> AccountRepository {
        AccountRepository::new(self.db.store())
    }

    /// Register a new account and open a session for it
    pub async fn signup(
        &self,
        input: &Map<String, Value>,
    ) -> Result<Authenticated<SignupResult>, AuthError> {
        // 1. Field check and password confirmation, before any storage access
        let mut fields = check_fields(SIGNUP_FIELDS, &[], input)?;
        if !passwords_match(
            fields.get("password").unwrap_or_default(),
            fields.get("confirm_password").unwrap_or_default(),
        ) {
            return Err(AuthError::PasswordMismatch);
        }

        let params = SignupParams {
            first_name: fields.take("first_name"),
            last_name: fields.take("last_name"),
            email_address: fields.take("email_address"),
            password: fields.take_non_blank("password"),
        };

        // 2. Account + profile, one transaction
        let result = self.repository().signup(params).await?;

        // 3. Session token
        let token = self.issuer.issue(&SessionClaims::from(result.clone()))?;

        Ok(Authenticated { result, token })
    }

    /// Check credentials and open a session
    pub async fn signin(
        &self,
        input: &Map<String, Value>,
    ) -> Result<Authenticated<SessionClaims>, AuthError> {
        let fields = check_fields(SIGNIN_FIELDS, &[], input)?;
        let email = fields.get("email_address").unwrap_or_default();

        let account = match self
            .repository()
            .authenticate(email, fields.get("password").unwrap_or_default())
            .await
        {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(email = %email, reason = e.name(), "Signin rejected");
                return Err(e.into());
            }
        };

        let claims = SessionClaims::from(account);
        let token = self.issuer.issue(&claims)?;
        tracing::info!(account_id = claims.id, "Signin succeeded");

        Ok(Authenticated {
            result: claims,
            token,
        })
    }

    /// Verify a session token
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        Ok(self.issuer.verify(token)?)
    }

    /// Current identity of a session holder.
    ///
    /// Re-reads the account so a deactivated account loses access even while
    /// its token is still valid.
    pub async fn me(&self, claims: &SessionClaims) -> Result<SessionClaims, AuthError> {
        self.repository()
            .find_active_by_id(claims.id)
            .await?
            .map(SessionClaims::from)
            .ok_or(AuthError::Unauthorized)
    }
}
