//! HTTP surface: maps each verb and path onto a component call, then renders
//! a page or redirects.

mod auth;
mod chat;
mod comments;
mod posts;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::error::AppError;
use crate::middleware::require_login;
use crate::state::{AppState, MAX_SESSION_IDLE_HOURS};

pub const SESSION_COOKIE: &str = "friendbook-session";

pub fn router(state: AppState) -> Router {
    let idle_hours = state
        .settings
        .session_idle_hours
        .clamp(1, MAX_SESSION_IDLE_HOURS);
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(state.settings.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::hours(idle_hours)));

    let members_only = Router::new()
        .route("/post", post(posts::create_post))
        .route("/comment/{post_id}", post(comments::create_comment))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/", get(posts::index))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/edit_post/{id}", post(posts::edit_post))
        .route("/delete_post/{id}", get(posts::delete_post))
        .route("/edit_comment/{id}", post(comments::edit_comment))
        .route("/delete_comment/{id}", get(comments::delete_comment))
        .route("/chat", get(chat::chat_page).post(chat::send_message))
        .route("/clearchat", get(chat::clear_chat))
        .route("/health", get(health))
        .merge(members_only)
        .fallback(not_found)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound("Page")
}
