//! Per-request session context: who is signed in, plus the flash queue.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::debug;

use friendbook_types::Identity;

use crate::error::AppError;

const IDENTITY_KEY: &str = "identity";
const FLASH_KEY: &str = "flash";

/// Identity of the current request, read from the session cookie.
/// `identity` is `None` for anonymous visitors.
pub struct RequestContext {
    pub session: Session,
    pub identity: Option<Identity>,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let identity = session
            .get::<Identity>(IDENTITY_KEY)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(Self { session, identity })
    }
}

impl RequestContext {
    /// Bind `identity` to this session. The session id is rotated first.
    pub async fn sign_in(&mut self, identity: Identity) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.session.insert(IDENTITY_KEY, &identity).await?;
        debug!(user_id = identity.user_id, "Session signed in");
        self.identity = Some(identity);
        Ok(())
    }

    /// Drop everything held by the session. Safe to call when anonymous.
    pub async fn sign_out(&mut self) -> Result<(), AppError> {
        self.session.flush().await?;
        self.identity = None;
        Ok(())
    }

    /// Queue a notice for the next rendered page.
    pub async fn flash(&self, message: impl Into<String>) -> Result<(), AppError> {
        let mut queued: Vec<String> = self.session.get(FLASH_KEY).await?.unwrap_or_default();
        queued.push(message.into());
        self.session.insert(FLASH_KEY, queued).await?;
        Ok(())
    }

    /// Consume queued notices. A second call returns nothing.
    pub async fn take_flashes(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .session
            .remove::<Vec<String>>(FLASH_KEY)
            .await?
            .unwrap_or_default())
    }
}
