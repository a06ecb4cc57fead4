//! userbase - minimal user-account backend
//!
//! Signup, signin and signed session tokens on PostgreSQL.
//!
//! # Modules
//!
//! - [`validation`] - Required/optional field checks on untyped request bodies
//! - [`db`] - Connection pool and the per-request transactional store
//! - [`account`] - Account and profile storage, signup transaction
//! - [`user_auth`] - Session tokens, auth service, HTTP handlers and session gate
//! - [`gateway`] - Router, shared state and server bootstrap
//! - [`response`] - Response envelope and error taxonomy
//! - [`config`] - YAML + environment configuration
//! - [`logging`] - tracing subscriber setup

pub mod account;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod response;
pub mod user_auth;
pub mod validation;

// Convenient re-exports at crate root
pub use account::{AccountError, AccountRepository, SignupParams, SignupResult};
pub use config::AppConfig;
pub use db::{Database, StoreError, TransactionalStore};
pub use response::{ErrorKind, ResponseData};
pub use user_auth::{AuthError, CredentialError, CredentialIssuer, SessionClaims, UserAuthService};
pub use validation::{MissingFields, SanitizedFields, ValidationResult, check_fields};
