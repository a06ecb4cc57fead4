use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::issuer::CredentialError;
use crate::account::AccountError;
use crate::response::{ErrorKind, ResponseData};
use crate::validation::MissingFields;

pub const UNAUTHORIZED_MESSAGE: &str = "You are unauthorized.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please re-login.";
const STORAGE_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Failures of the user-facing auth flows
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    MissingFields(#[from] MissingFields),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields(_) | Self::PasswordMismatch => ErrorKind::Validation,
            Self::Unauthorized => ErrorKind::Credential,
            Self::Account(e) => e.kind(),
            Self::Credential(e) => e.kind(),
        }
    }

    pub fn http_status(&self) -> StatusCode {
        self.kind().http_status()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Account(e) => e.name(),
            Self::Credential(e) => e.name(),
        }
    }

    /// Text safe to show the caller. Storage and signing details stay in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Credential(CredentialError::TokenExpired) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Credential(CredentialError::TokenInvalid(_)) => UNAUTHORIZED_MESSAGE.to_string(),
            _ if matches!(self.kind(), ErrorKind::Storage | ErrorKind::Internal) => {
                STORAGE_FAILURE_MESSAGE.to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(error = %self, reason = self.name(), "Request failed");
        }

        ResponseData::<()>::failure(self.name(), self.user_message())
            .with_code(status)
            .into_response()
    }
}
