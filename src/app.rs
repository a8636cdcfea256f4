/*
 * Responsibility
 * - Config読み込み → 依存生成 (token verifier / account directory / profile store) → Router 組み立て
 * - Middleware の適用 (auth gate + HTTP 共通レイヤ)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    repos::account_repo::PgAccountDirectory,
    services::{
        cache::{memory::MemoryCacheClient, valkey::ValkeyClient},
        identity::{AccountDirectory, JwtTokenVerifier, MemoryAccountDirectory},
        profile::{ProfileStore, kv::KvProfileStore},
    },
    state::{AppState, AuthSettings},
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,identity_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,identity_api=debug,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash immediately. production: default hook, server keeps running.
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
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = middleware::http::apply(build_router(state), &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

pub async fn build_state(config: &Config) -> Result<AppState> {
    let verifier = JwtTokenVerifier::from_ed_pem(
        &config.access_jwt_public_key_pem,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )
    .context("invalid ACCESS_JWT_PUBLIC_KEY_PEM")?;

    let accounts: Arc<dyn AccountDirectory> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            Arc::new(PgAccountDirectory::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(MemoryAccountDirectory::new())
        }
    };

    let profiles: Arc<dyn ProfileStore> = match &config.redis_url {
        Some(url) => {
            let client = ValkeyClient::new(url)
                .await
                .context("failed to connect to REDIS_URL")?;
            Arc::new(KvProfileStore::new(client))
        }
        None => {
            tracing::warn!("REDIS_URL not set, profiles are kept in memory");
            Arc::new(KvProfileStore::new(MemoryCacheClient::new()))
        }
    };

    tracing::info!(
        accounts = accounts.backend_name(),
        profiles = profiles.backend_name(),
        public_paths = ?config.public_paths,
        "backends ready"
    );

    Ok(AppState::new(
        Arc::new(verifier),
        accounts,
        profiles,
        AuthSettings::from_config(config),
    ))
}

/// `/api` routes behind the authentication gate.
///
/// HTTP-level layers (`middleware::http`) are added by the caller.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new().nest("/api", api::routes());
    let router = middleware::auth::gate::apply(router, state.gate.clone());

    router.with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
