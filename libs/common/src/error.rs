//! Custom error types for the common library
//!
//! This module defines infrastructure error types that can be used
//! throughout the services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error raised while hashing or verifying passwords
#[derive(Error, Debug)]
pub enum PasswordError {
    /// The hasher rejected the input
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string
    #[error("Failed to parse password hash: {0}")]
    InvalidHash(String),
}

/// Error raised while loading application settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    Load(#[from] config::ConfigError),
}
