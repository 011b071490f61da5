use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use tracing::info;

use friendbook_types::forms::{LoginForm, RegisterForm};

use crate::accounts;
use crate::error::AppError;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};
use crate::views::{LoginTemplate, RegisterTemplate, render};

pub async fn register_page(ctx: RequestContext) -> Result<Html<String>, AppError> {
    let flashes = ctx.take_flashes().await?;
    render(&RegisterTemplate { flashes })
}

pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let outcome =
        run_blocking(&state, move |db| accounts::register(db, &form.username, &form.password))
            .await;

    match outcome {
        Ok(_) => {
            ctx.flash("Registered! Please log in.").await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) if e.is_user_facing() => {
            ctx.flash(e.to_string()).await?;
            Ok(Redirect::to("/register"))
        }
        Err(e) => Err(e),
    }
}

pub async fn login_page(ctx: RequestContext) -> Result<Html<String>, AppError> {
    let flashes = ctx.take_flashes().await?;
    render(&LoginTemplate { flashes })
}

pub async fn login(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let outcome =
        run_blocking(&state, move |db| accounts::login(db, &form.username, &form.password)).await;

    match outcome {
        Ok(identity) => {
            info!(user_id = identity.user_id, "User logged in");
            ctx.sign_in(identity).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) if e.is_user_facing() => {
            ctx.flash(e.to_string()).await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(mut ctx: RequestContext) -> Result<Redirect, AppError> {
    if let Some(identity) = &ctx.identity {
        info!(user_id = identity.user_id, "User logged out");
    }
    ctx.sign_out().await?;
    Ok(Redirect::to("/"))
}
