/*
 * Responsibility
 * - v1 URL layout
 * - /auth/login and /auth/register are public by virtue of the bypass list, not of routing
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{check, login, register},
    users::me,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/check", post(check))
        .route("/users/me", get(me))
}
