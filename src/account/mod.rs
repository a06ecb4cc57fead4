//! Account management module
//!
//! PostgreSQL-backed storage for accounts (`users`) and their profiles.

pub mod error;
pub mod models;
pub mod password;
pub mod repository;

// Re-export commonly used types
pub use error::AccountError;
pub use models::{Account, SignupParams, SignupResult};
pub use repository::AccountRepository;
