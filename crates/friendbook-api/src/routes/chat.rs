use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use tracing::warn;

use friendbook_types::forms::ChatForm;

use crate::chat;
use crate::error::AppError;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};
use crate::views::{ChatTemplate, render};

pub async fn chat_page(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Html<String>, AppError> {
    let messages = run_blocking(&state, chat::list_messages).await?;
    let flashes = ctx.take_flashes().await?;

    render(&ChatTemplate {
        flashes,
        viewer: ctx.identity,
        messages,
    })
}

pub async fn send_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<ChatForm>,
) -> Result<Redirect, AppError> {
    let Some(author) = ctx.identity.clone() else {
        ctx.flash("Log in to use the chat.").await?;
        return Ok(Redirect::to("/login"));
    };

    let outcome =
        run_blocking(&state, move |db| chat::post_message(db, &author, &form.message)).await;

    match outcome {
        Ok(_) => Ok(Redirect::to("/chat")),
        Err(e) if e.is_user_facing() => {
            ctx.flash(e.to_string()).await?;
            Ok(Redirect::to("/chat"))
        }
        Err(e) => Err(e),
    }
}

/// GET /clearchat. Open to everyone unless `clear_chat_requires_login` is set.
pub async fn clear_chat(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Redirect, AppError> {
    if ctx.identity.is_none() {
        if state.settings.clear_chat_requires_login {
            ctx.flash("Log in to clear the chat.").await?;
            return Ok(Redirect::to("/login"));
        }
        warn!("Chat cleared by an anonymous visitor");
    }

    run_blocking(&state, chat::clear_all).await?;
    Ok(Redirect::to("/chat"))
}
