//! Domain rules for the material control application
//!
//! This crate holds the small amount of business logic shared by the
//! services: inventory categories, user roles, the access policy that
//! decides who may touch which category, and the status normalization
//! used when records are written and summarized.

pub mod access;
pub mod category;
pub mod error;
pub mod money;
pub mod role;
pub mod status;
pub mod summary;

pub use access::{GrantSet, PermissionSource, Principal};
pub use category::Category;
pub use error::DomainError;
pub use role::Role;
pub use status::{CanonicalStatus, normalize};
pub use summary::{StatusSummary, summarize};
