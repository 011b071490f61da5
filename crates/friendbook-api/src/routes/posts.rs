use axum::{
    Extension, Form,
    extract::State,
    response::{Html, Redirect},
};

use friendbook_types::{Identity, forms::ContentForm};

use crate::content;
use crate::error::AppError;
use crate::extract::ResourceId;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};
use crate::views::{IndexTemplate, render};

pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Html<String>, AppError> {
    let viewer = ctx.identity.clone();
    let posts = run_blocking(&state, move |db| content::feed(db, viewer.as_ref())).await?;
    let flashes = ctx.take_flashes().await?;

    render(&IndexTemplate {
        flashes,
        viewer: ctx.identity,
        posts,
    })
}

/// POST /post. Behind `require_login`.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(author): Extension<Identity>,
    ctx: RequestContext,
    Form(form): Form<ContentForm>,
) -> Result<Redirect, AppError> {
    let outcome =
        run_blocking(&state, move |db| content::create_post(db, &author, &form.content)).await;
    back_home(&ctx, outcome).await
}

pub async fn edit_post(
    State(state): State<AppState>,
    ResourceId(post_id): ResourceId,
    ctx: RequestContext,
    Form(form): Form<ContentForm>,
) -> Result<Redirect, AppError> {
    let viewer = ctx.identity.clone();
    let outcome = run_blocking(&state, move |db| {
        content::edit_post(db, post_id, viewer.as_ref(), &form.content)
    })
    .await;
    back_home(&ctx, outcome).await
}

pub async fn delete_post(
    State(state): State<AppState>,
    ResourceId(post_id): ResourceId,
    ctx: RequestContext,
) -> Result<Redirect, AppError> {
    let viewer = ctx.identity.clone();
    let outcome =
        run_blocking(&state, move |db| content::delete_post(db, post_id, viewer.as_ref())).await;
    back_home(&ctx, outcome).await
}

/// Redirect to the feed, flashing input mistakes. Ownership and lookup
/// failures fall through to the error page.
pub(super) async fn back_home<T>(
    ctx: &RequestContext,
    outcome: Result<T, AppError>,
) -> Result<Redirect, AppError> {
    match outcome {
        Ok(_) => Ok(Redirect::to("/")),
        Err(e) if e.is_user_facing() => {
            ctx.flash(e.to_string()).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => Err(e),
    }
}
