//! Common library for the material control services
//!
//! This crate provides shared infrastructure used by the auth and api
//! services: database connectivity, the Redis session store, password
//! hashing, token verification and application settings.

pub mod database;
pub mod error;
pub mod password;
pub mod session;
pub mod settings;
pub mod token;
