//! Error types for parsing domain values

use thiserror::Error;

/// Error returned when a domain value cannot be parsed from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The category code is not one of CL2, CL6 or CL7
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The role name is not one of admin, all or user
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
