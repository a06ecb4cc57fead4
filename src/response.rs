//! Uniform response envelope and error taxonomy
//!
//! - `ResponseData<T>`: the `{code, status, result?, error, message}` envelope
//!   every core operation and HTTP endpoint renders
//! - `ErrorKind`: coarse failure classes and their HTTP mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

// ============================================================================
// Response Envelope
// ============================================================================

/// Uniform response envelope
///
/// - code: HTTP status the boundary layer renders (absent for core-only results)
/// - status: true on success
/// - result: payload, only present on success
/// - error: stable error name for diagnostics, null on success
/// - message: human-readable text, safe to display
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResponseData<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 200)]
    pub code: Option<u16>,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ResponseData<T> {
    /// Successful envelope carrying `result`
    pub fn success(result: T) -> Self {
        Self {
            code: None,
            status: true,
            result: Some(result),
            error: None,
            message: None,
        }
    }

    /// Failed envelope with no result
    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: false,
            result: None,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }

    /// Attach the HTTP status the envelope will be rendered with
    pub fn with_code(mut self, code: StatusCode) -> Self {
        self.code = Some(code.as_u16());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ResponseData<T> {
    fn into_response(self) -> Response {
        let status = self
            .code
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(if self.status {
                StatusCode::OK
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            });
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Failure classes shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input, user-correctable
    Validation,
    /// Email already registered
    Conflict,
    /// Connection, query or transaction failure
    Storage,
    /// Bad credentials, or a session token that is invalid or expired
    Credential,
    /// Server-side misuse (e.g. signing an empty claim set)
    Internal,
}

impl ErrorKind {
    /// HTTP status for this class.
    ///
    /// Conflicts render as 400, not 409: clients treat every business
    /// rejection of a signup the same way.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Validation | Self::Conflict => StatusCode::BAD_REQUEST,
            Self::Credential => StatusCode::UNAUTHORIZED,
            Self::Storage | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
