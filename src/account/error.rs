use thiserror::Error;

use crate::db::StoreError;
use crate::response::ErrorKind;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Email address is already registered")]
    EmailTaken,

    #[error("Failed to set the account password: {0}")]
    PasswordHash(String),

    #[error("Failed to create the account profile: {0}")]
    ProfileCreate(#[source] StoreError),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEmail | Self::FieldTooLong { .. } => ErrorKind::Validation,
            Self::EmailTaken => ErrorKind::Conflict,
            Self::InvalidCredentials => ErrorKind::Credential,
            Self::PasswordHash(_) | Self::ProfileCreate(_) | Self::Store(_) => ErrorKind::Storage,
        }
    }

    /// Stable error name for response envelopes
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::FieldTooLong { .. } => "FIELD_TOO_LONG",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::PasswordHash(_) => "PASSWORD_HASH_FAILED",
            Self::ProfileCreate(_) => "PROFILE_CREATE_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Store(e) => e.name(),
        }
    }
}
