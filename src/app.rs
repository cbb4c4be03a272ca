/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (authenticate → access, security headers, http)
 * - axum::serve() で起動
 */
use std::net::SocketAddr;
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{self, auth::access::AccessPolicy};
use crate::repos::user_repo::InMemoryUserRepo;
use crate::services::auth::build_token_service;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let bcrypt_cost = config.bcrypt_cost;
    // Hashing the seed passwords is CPU bound.
    let users = tokio::task::spawn_blocking(move || InMemoryUserRepo::with_demo_users(bcrypt_cost))
        .await
        .context("seeding users")??;
    tracing::info!(users = users.len(), "user directory ready");

    let tokens = build_token_service(config);
    let policy = Arc::new(AccessPolicy::default_rules());

    Ok(AppState::new(tokens, Arc::new(users), policy))
}

/// The full application: v1 routes, authentication, access control and the
/// HTTP layers.
///
/// Auth layers are applied after `nest`, so the middleware sees full paths
/// (`/api/v1/...`). Unmatched paths go through them too and get 401 for
/// anonymous callers.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .fallback(not_found)
        .with_state(state.clone());

    // Layers wrap what is already there: the last applied runs first.
    let router = middleware::auth::access::apply(router, state.policy.clone());
    let router = middleware::auth::authenticate::apply(router, state);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
