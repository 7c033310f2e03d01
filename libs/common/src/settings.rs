//! Application settings
//!
//! Loaded with the `config` crate from `APP_*` environment variables on top
//! of built-in defaults.

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::SettingsError;

/// Settings shared by the auth and api services
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Title shown on the dashboard and in exported reports
    pub name: String,
    pub version: String,
    /// Mark the session cookie `Secure` (enable behind HTTPS)
    pub cookie_secure: bool,
    /// Listen address of the auth service
    pub auth_bind: String,
    /// Listen address of the api service
    pub api_bind: String,
    /// Records per page on inventory listings
    pub page_size: u32,
}

impl AppSettings {
    /// Load settings from the environment
    ///
    /// # Environment Variables
    /// - `APP_NAME` (default: "SISTEMA DE CONTROLE DE MATERIAL")
    /// - `APP_VERSION` (default: "1.2.4")
    /// - `APP_COOKIE_SECURE` (default: false)
    /// - `APP_AUTH_BIND` (default: "0.0.0.0:3000")
    /// - `APP_API_BIND` (default: "0.0.0.0:3001")
    /// - `APP_PAGE_SIZE` (default: 10)
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .set_default("name", "SISTEMA DE CONTROLE DE MATERIAL")?
            .set_default("version", "1.2.4")?
            .set_default("cookie_secure", false)?
            .set_default("auth_bind", "0.0.0.0:3000")?
            .set_default("api_bind", "0.0.0.0:3001")?
            .set_default("page_size", 10)?
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .build()?
            .try_deserialize::<AppSettings>()?;

        Ok(settings)
    }
}
