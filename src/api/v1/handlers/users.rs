/*
 * Responsibility
 * - GET /users/me: the principal bound to this request by the authentication filter
 */
use axum::Json;

use crate::api::v1::dto::users::MeResponse;
use crate::api::v1::extractors::CurrentUser;

pub async fn me(CurrentUser(ctx): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse::from(ctx))
}
