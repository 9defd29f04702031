use std::path::PathBuf;
use std::str::FromStr;

/// Runtime settings, read from the environment (and an optional `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub database_url: String,
    pub pool_size: u32,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub client_label: String,
    pub page_size: usize,
    pub admin_password: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_url: "bitacora.db".to_string(),
            pool_size: 8,
            log_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            client_label: "liga-admin".to_string(),
            page_size: 10,
            admin_password: "admin1234".to_string(),
        }
    }
}

impl ServerSettings {
    /// Load settings from the process environment, after applying `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            database_url: text("DATABASE_URL", defaults.database_url),
            pool_size: parse_or(&lookup, "BITACORA_POOL_SIZE", defaults.pool_size).max(1),
            log_level: text("BITACORA_LOG_LEVEL", defaults.log_level),
            log_dir: lookup("BITACORA_LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            client_label: text("BITACORA_CLIENT_LABEL", defaults.client_label),
            page_size: parse_or(&lookup, "BITACORA_PAGE_SIZE", defaults.page_size).max(1),
            admin_password: text("BITACORA_ADMIN_PASSWORD", defaults.admin_password),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, fallback: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}, using {fallback}");
            fallback
        }),
        None => fallback,
    }
}
