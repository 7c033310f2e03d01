//! Authentication service models

pub mod user;

pub use user::{LoginCredentials, User};
