//! Common error types for casefuse

use thiserror::Error;

/// Common result type for casefuse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across casefuse crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
