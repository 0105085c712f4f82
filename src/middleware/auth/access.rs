//! Bearer authentication filter: runs `RequestAuthenticator` for every request and installs
//! a `SecurityContext` into the request extensions when the token checks out.
//!
//! The filter never rejects. Whatever the outcome, the request goes to the next layer exactly
//! once; handlers that need an identity use the `CurrentUser` extractor (401 when absent).

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::debug;

use crate::services::auth::{Outcome, SecurityContext};
use crate::state::AppState;

/// Apply the authentication filter to every route of `router`.
///
/// Example:
/// ```ignore
/// let app = Router::new().nest("/api/v1", api::v1::routes());
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 `from_fn` cannot take the State extractor; pass it explicitly
    router.layer(middleware::from_fn_with_state(state, authentication_filter))
}

async fn authentication_filter(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Nested routers see a stripped uri; bypass paths are full paths.
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|u| u.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let authorization = req.headers().get(header::AUTHORIZATION).cloned();
    let has_context = req.extensions().get::<SecurityContext>().is_some();

    debug!(path = %path, "request path");

    let outcome = state
        .authenticator
        .authenticate(&path, authorization.as_ref(), has_context)
        .await;

    match outcome {
        Outcome::Authenticated(ctx) => {
            debug!(
                path = %path,
                identifier = %ctx.principal.identifier,
                role = %ctx.principal.role,
                "request authenticated"
            );
            // middleware -> extractor hand-off
            req.extensions_mut().insert(ctx);
        }
        Outcome::Rejected(reason) => {
            debug!(path = %path, %reason, "bearer token not accepted; continuing unauthenticated");
        }
        other => {
            debug!(path = %path, outcome = other.label(), "authentication skipped");
        }
    }

    next.run(req).await
}
