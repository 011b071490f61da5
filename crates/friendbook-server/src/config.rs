use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use friendbook_api::{MAX_SESSION_IDLE_HOURS, Settings};

/// Process configuration, read from `FRIENDBOOK_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db_path = PathBuf::from(var("FRIENDBOOK_DB_PATH", "friendbook.db"));
        let host = var("FRIENDBOOK_HOST", "0.0.0.0");
        let port: u16 = var("FRIENDBOOK_PORT", "10000")
            .parse()
            .context("FRIENDBOOK_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let session_idle_hours: i64 = var("FRIENDBOOK_SESSION_IDLE_HOURS", "24")
            .parse()
            .context("FRIENDBOOK_SESSION_IDLE_HOURS must be a whole number of hours")?;
        if !(1..=MAX_SESSION_IDLE_HOURS).contains(&session_idle_hours) {
            anyhow::bail!(
                "FRIENDBOOK_SESSION_IDLE_HOURS must be between 1 and {}",
                MAX_SESSION_IDLE_HOURS
            );
        }

        let settings = Settings {
            secure_cookies: flag(&var("FRIENDBOOK_SECURE_COOKIES", "false")),
            session_idle_hours,
            clear_chat_requires_login: flag(&var("FRIENDBOOK_CLEAR_CHAT_REQUIRES_LOGIN", "false")),
        };

        Ok(Self {
            db_path,
            addr,
            settings,
        })
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
