//! User authentication
//!
//! Signup, signin and cookie-based sessions on top of the account repository.

pub mod error;
pub mod handlers;
pub mod issuer;
pub mod middleware;
pub mod service;

pub use error::AuthError;
pub use issuer::{CredentialError, CredentialIssuer, SessionClaims};
pub use service::{Authenticated, UserAuthService};
