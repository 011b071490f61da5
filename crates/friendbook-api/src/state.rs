use std::sync::Arc;

use tracing::error;

use friendbook_db::Database;

use crate::error::AppError;

pub type AppState = Arc<AppStateInner>;

/// Longest accepted idle session lifetime: ten years.
pub const MAX_SESSION_IDLE_HOURS: i64 = 24 * 365 * 10;

pub struct AppStateInner {
    pub db: Database,
    pub settings: Settings,
}

/// Runtime knobs that shape request handling.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    pub secure_cookies: bool,
    /// Sessions expire after this many hours without a request.
    /// Clamped to `1..=MAX_SESSION_IDLE_HOURS` when the router is built.
    pub session_idle_hours: i64,
    /// When false, anyone (signed in or not) may clear the chat room.
    pub clear_chat_requires_login: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            session_idle_hours: 24,
            clear_chat_requires_login: false,
        }
    }
}

impl AppStateInner {
    pub fn new(db: Database, settings: Settings) -> AppState {
        Arc::new(Self { db, settings })
    }
}

/// Run a store operation off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}
