//! Repository layer for account storage

use chrono::Utc;
use sqlx::Row;

use super::error::AccountError;
use super::models::{Account, SignupParams, SignupResult};
use super::password;
use crate::db::{StoreError, TransactionalStore};
use crate::validation::{validate_email, within_length};

// Column widths of `users`
const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 255;

const SELECT_ACTIVE_ACCOUNT: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.email_address, u.password,
           u.is_active, u.created_at, u.updated_at, p.id AS profile_id
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
    WHERE u.is_active = TRUE"#;

/// Account reads and the signup write path.
///
/// Every call runs on the repository's own store: build one repository per
/// request and let it go when the request ends.
pub struct AccountRepository {
    store: TransactionalStore,
}

impl AccountRepository {
    pub fn new(store: TransactionalStore) -> Self {
        Self { store }
    }

    /// Active account with this email (case-insensitive), `None` when absent
    pub async fn find_active_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<Account>, AccountError> {
        let sql = format!(
            "{} AND LOWER(u.email_address) = LOWER($1)",
            SELECT_ACTIVE_ACCOUNT
        );
        let account = self
            .store
            .fetch_optional_as(sqlx::query_as::<_, Account>(&sql).bind(email.trim()))
            .await?;
        Ok(account)
    }

    /// Active account by id, `None` when absent or deactivated
    pub async fn find_active_by_id(&mut self, id: i64) -> Result<Option<Account>, AccountError> {
        let sql = format!("{} AND u.id = $1", SELECT_ACTIVE_ACCOUNT);
        let account = self
            .store
            .fetch_optional_as(sqlx::query_as::<_, Account>(&sql).bind(id))
            .await?;
        Ok(account)
    }

    /// Register an account and its profile in one transaction.
    ///
    /// Any failure after `begin` rolls the whole transaction back, so an
    /// account never exists without its profile.
    pub async fn signup(&mut self, params: SignupParams) -> Result<SignupResult, AccountError> {
        check_lengths(&params)?;

        self.store.begin().await?;

        match self.insert_account(&params).await {
            Ok(result) => {
                self.store.commit().await?;
                tracing::info!(
                    account_id = result.id,
                    profile_id = result.profile_id,
                    "Account registered"
                );
                Ok(result)
            }
            Err(err) => {
                let envelope = self.store.rollback(&err, "Signup rolled back").await;
                tracing::warn!(
                    email = %params.email_address,
                    error = ?envelope.error,
                    reason = err.name(),
                    "Signup failed"
                );
                Err(err)
            }
        }
    }

    async fn insert_account(&mut self, params: &SignupParams) -> Result<SignupResult, AccountError> {
        if !validate_email(&params.email_address) {
            return Err(AccountError::InvalidEmail);
        }

        if self
            .find_active_by_email(&params.email_address)
            .await?
            .is_some()
        {
            return Err(AccountError::EmailTaken);
        }

        // One timestamp for both created_at and updated_at of every row
        let now = Utc::now();
        let email = params.email_address.trim();

        let row = self
            .store
            .fetch_one(
                sqlx::query(
                    r#"
                    INSERT INTO users (first_name, last_name, email_address, is_active, created_at, updated_at)
                    VALUES ($1, $2, $3, TRUE, $4, $4)
                    RETURNING id
                    "#,
                )
                .bind(&params.first_name)
                .bind(&params.last_name)
                .bind(email)
                .bind(now),
            )
            .await
            .map_err(|e| {
                // A concurrent signup committed the same email after our lookup
                if e.is_unique_violation() {
                    AccountError::EmailTaken
                } else {
                    AccountError::Store(e)
                }
            })?;
        let account_id: i64 = row.try_get("id").map_err(StoreError::from)?;

        if let Some(password) = params.password.as_deref().filter(|p| !p.is_empty()) {
            self.set_password(account_id, password).await?;
        }

        let profile_id = self
            .insert_profile(account_id, now)
            .await
            .map_err(AccountError::ProfileCreate)?;

        Ok(SignupResult {
            id: account_id,
            profile_id,
            first_name: params.first_name.clone(),
            last_name: params.last_name.clone(),
            email_address: email.to_string(),
        })
    }

    async fn set_password(&mut self, account_id: i64, password: &str) -> Result<(), AccountError> {
        let digest = password::derive_digest(account_id, password)
            .map_err(|e| AccountError::PasswordHash(e.to_string()))?;

        let updated = self
            .store
            .execute(
                sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
                    .bind(&digest)
                    .bind(account_id),
            )
            .await?;

        if updated.rows_affected() != 1 {
            return Err(AccountError::PasswordHash(format!(
                "expected 1 row updated, got {}",
                updated.rows_affected()
            )));
        }
        Ok(())
    }

    async fn insert_profile(
        &mut self,
        account_id: i64,
        now: chrono::DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row = self
            .store
            .fetch_one(
                sqlx::query(
                    r#"
                    INSERT INTO profiles (user_id, is_private, created_at, updated_at)
                    VALUES ($1, FALSE, $2, $2)
                    RETURNING id
                    "#,
                )
                .bind(account_id)
                .bind(now),
            )
            .await?;
        Ok(row.try_get("id")?)
    }

    /// Active account whose stored digest matches `password`.
    ///
    /// Unknown email, missing digest and wrong password all fail the same way.
    pub async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let account = self
            .find_active_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let digest = account
            .password_digest
            .as_deref()
            .ok_or(AccountError::InvalidCredentials)?;

        if !password::verify_digest(account.id, password, digest) {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(account)
    }
}

/// Reject values the `users` columns cannot hold, before any storage access
fn check_lengths(params: &SignupParams) -> Result<(), AccountError> {
    let fields = [
        ("first_name", params.first_name.as_str(), MAX_NAME_LEN),
        ("last_name", params.last_name.as_str(), MAX_NAME_LEN),
        ("email_address", params.email_address.trim(), MAX_EMAIL_LEN),
    ];
    for (field, value, max) in fields {
        if !within_length(value, max) {
            return Err(AccountError::FieldTooLong { field, max });
        }
    }
    Ok(())
}
