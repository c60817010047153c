use std::env;

use anyhow::{Context, anyhow};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Dev,
    Prod,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub log_filter: String,
    /// Keys that were present in the environment. Values are never kept here.
    pub configured_keys: Vec<&'static str>,
}

const DEV_DATABASE_URL: &str = "sqlite:songs.db?mode=rwc";
const KEYS: [&str; 5] = ["MODE", "DATABASE_URL", "BIND_ADDR", "PORT", "LOG_FILTER"];

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match get("MODE") {
            Some(mode) if mode.to_lowercase() == "prod" => Mode::Prod,
            _ => Mode::Dev,
        };

        let database_url = match (mode, get("DATABASE_URL")) {
            (_, Some(url)) => url,
            (Mode::Dev, None) => DEV_DATABASE_URL.to_string(),
            (Mode::Prod, None) => {
                return Err(anyhow!("DATABASE_URL must be set in production mode"));
            }
        };

        let port = match get("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?,
            None => 8000,
        };

        let configured_keys = KEYS.into_iter().filter(|&key| get(key).is_some()).collect();

        Ok(Settings {
            mode,
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_filter: get("LOG_FILTER").unwrap_or_else(|| "info".to_string()),
            configured_keys,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
