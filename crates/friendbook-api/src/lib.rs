pub mod accounts;
pub mod chat;
pub mod content;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

pub use error::AppError;
pub use routes::router;
pub use state::{AppState, AppStateInner, MAX_SESSION_IDLE_HOURS, Settings};
