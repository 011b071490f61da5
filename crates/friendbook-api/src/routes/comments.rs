use axum::{
    Extension, Form,
    extract::State,
    response::Redirect,
};

use friendbook_types::{
    Identity,
    forms::{CommentForm, ContentForm},
};

use super::posts::back_home;
use crate::content;
use crate::error::AppError;
use crate::extract::ResourceId;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};

/// POST /comment/{post_id}. Behind `require_login`.
pub async fn create_comment(
    State(state): State<AppState>,
    ResourceId(post_id): ResourceId,
    Extension(author): Extension<Identity>,
    ctx: RequestContext,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    let outcome = run_blocking(&state, move |db| {
        content::create_comment(db, post_id, &author, &form.comment)
    })
    .await;
    back_home(&ctx, outcome).await
}

pub async fn edit_comment(
    State(state): State<AppState>,
    ResourceId(comment_id): ResourceId,
    ctx: RequestContext,
    Form(form): Form<ContentForm>,
) -> Result<Redirect, AppError> {
    let viewer = ctx.identity.clone();
    let outcome = run_blocking(&state, move |db| {
        content::edit_comment(db, comment_id, viewer.as_ref(), &form.content)
    })
    .await;
    back_home(&ctx, outcome).await
}

pub async fn delete_comment(
    State(state): State<AppState>,
    ResourceId(comment_id): ResourceId,
    ctx: RequestContext,
) -> Result<Redirect, AppError> {
    let viewer = ctx.identity.clone();
    let outcome = run_blocking(&state, move |db| {
        content::delete_comment(db, comment_id, viewer.as_ref())
    })
    .await;
    back_home(&ctx, outcome).await
}
