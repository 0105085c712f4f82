/*
 * Responsibility
 * - Config -> dependencies (credential store, signing key, token services) -> Router
 * - Middleware order (outermost first): http, security headers, cors, authentication filter
 * - axum::serve() startup
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware;
use crate::repos::{CredentialStore, InMemoryUserRepo, PgUserRepo};
use crate::services::auth::{KeyManager, build_auth_services};
use crate::services::password::Argon2Passwords;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,user_auth=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash so it gets noticed; production: keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting user-auth in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn CredentialStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            sqlx::migrate!()
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("credential store: postgres");
            Ok(Arc::new(PgUserRepo::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory credential store");
            Ok(Arc::new(InMemoryUserRepo::new()))
        }
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    let users = build_store(config).await?;
    Ok(assemble_state(config, users))
}

fn assemble_state(config: &Config, users: Arc<dyn CredentialStore>) -> AppState {
    // Resolved once here; every issuer/validator shares the same key.
    let keys = KeyManager::new();
    let auth = build_auth_services(config, &keys, Arc::clone(&users));

    AppState::new(
        users,
        Arc::new(Argon2Passwords::new()),
        auth.issuer,
        auth.authenticator,
    )
}

fn build_router(state: AppState, config: &Config) -> Router {
    let api = Router::new().nest("/api/v1", api::v1::routes());
    let api = middleware::auth::access::apply(api, state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}
