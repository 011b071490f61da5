use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::RequestContext;

/// Send anonymous visitors to the login page; otherwise expose the
/// signed-in `Identity` to the handler as a request extension.
pub async fn require_login(ctx: RequestContext, mut req: Request, next: Next) -> Response {
    let Some(identity) = ctx.identity.clone() else {
        if let Err(e) = ctx.flash("Please log in first.").await {
            return e.into_response();
        }
        return Redirect::to("/login").into_response();
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}
