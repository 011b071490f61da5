use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::views::ErrorTemplate;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username already exists.")]
    DuplicateUsername,

    #[error("Invalid login.")]
    InvalidCredentials,

    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("session store failure: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Errors caused by what the user typed. Handlers show these as a flash
    /// on the form they came from instead of an error page.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUsername | Self::InvalidCredentials | Self::Validation(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateUsername => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details go to the log, not the page.
        let message = if status.is_server_error() {
            error!("Request failed: {:#}", self);
            "Something went wrong on our side.".to_string()
        } else {
            self.to_string()
        };

        let page = ErrorTemplate {
            flashes: vec![],
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                error!("Failed to render error page: {:?}", e);
                (status, page.message).into_response()
            }
        }
    }
}
