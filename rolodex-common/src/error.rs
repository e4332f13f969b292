//! Common error types for rolodex

use thiserror::Error;

/// Common result type for rolodex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across rolodex crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
