/*
 * Responsibility
 * - POST /auth/login, /auth/register (bypass paths: the filter never inspects them)
 * - POST /auth/check (reports whether the filter authenticated this request)
 * - Login failures surface as explicit 401s, unlike the filter which degrades silently
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::api::v1::dto::auth::{
    CheckTokenResponse, LoginRequest, RegisterRequest, RegisterResponse, RegisteredUser,
    TokenResponse,
};
use crate::api::v1::extractors::MaybeUser;
use crate::error::AppError;
use crate::repos::{NewUser, RepoError};
use crate::state::AppState;

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn invalid(msg: &'static str) -> AppError {
    AppError::bad_request("INVALID_REQUEST", msg)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(invalid)?;

    let principal = state
        .users
        .find_by_identifier(req.email.trim())
        .await?
        .ok_or_else(|| {
            debug!("login rejected: unknown identifier");
            AppError::unauthorized("incorrect email")
        })?;

    if !state.passwords.verify(&req.password, &principal.password_hash) {
        debug!(identifier = %principal.identifier, "login rejected: password mismatch");
        return Err(AppError::unauthorized("incorrect password"));
    }

    let token = state.issuer.issue_now(&principal)?;
    info!(identifier = %principal.identifier, role = %principal.role, "token issued");

    Ok(no_store(Json(TokenResponse { token }).into_response()))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let role = req.validate().map_err(invalid)?;

    let email = req.email.trim().to_string();
    if state.users.find_by_identifier(&email).await?.is_some() {
        return Err(AppError::conflict("USER_EXISTS", "user already exists"));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let principal = state
        .users
        .create(NewUser {
            name: req.name.trim().to_string(),
            identifier: email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            RepoError::Conflict => AppError::conflict("USER_EXISTS", "user already exists"),
            other => AppError::from(other),
        })?;

    info!(identifier = %principal.identifier, role = %principal.role, "user registered");

    let body = RegisterResponse {
        message: "user created",
        response: RegisteredUser::from(&principal),
    };
    Ok(no_store((StatusCode::CREATED, Json(body)).into_response()))
}

pub async fn check(MaybeUser(ctx): MaybeUser) -> Json<CheckTokenResponse> {
    Json(CheckTokenResponse::new(ctx.is_some()))
}
