use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::SecurityContext;

/// Extractor for handlers that require an authenticated principal.
/// Relies on the authentication filter having inserted a SecurityContext.
pub struct CurrentUser(pub SecurityContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("authentication required"))
    }
}

/// Extractor for handlers that behave differently for anonymous callers.
pub struct MaybeUser(pub Option<SecurityContext>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<SecurityContext>().cloned()))
    }
}
