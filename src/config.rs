use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::i18n::Locale;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Upper bound of the Postgres connection pool.
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    /// HS256 key for session tokens.
    pub session_secret: String,
    /// Shared static key devices send in `X-API-Key`.
    pub api_key: String,
    /// PIN guarding the technician debug panel.
    pub debug_pin: String,
    /// Accepted for deployment parity; no inference provider is called.
    pub third_party_api_key: Option<String>,
    /// Directory uploaded images are written to.
    pub upload_dir: PathBuf,
    pub default_locale: Locale,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("missing required env var: {key}"))
        };
        let optional =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("PORT", "8080")
                .parse()
                .context("PORT must be a valid port number")?,
            session_secret: required("SESSION_SECRET")?,
            api_key: required("API_KEY")?,
            debug_pin: required("DEBUG_PIN")?,
            third_party_api_key: lookup("THIRD_PARTY_API_KEY").filter(|v| !v.is_empty()),
            upload_dir: PathBuf::from(optional("UPLOAD_DIR", "uploads")),
            default_locale: optional("DEFAULT_LOCALE", "en")
                .parse()
                .context("DEFAULT_LOCALE must be one of: en, es")?,
        })
    }
}
