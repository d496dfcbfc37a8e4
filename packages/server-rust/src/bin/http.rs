//! HTTP-facing entry point: serves the synchronous user API.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use roster_server::config::AppConfig;
use roster_server::http::{self, AppState};
use roster_server::service::{AuthService, UserService};
use roster_server::storage::{postgres, PgUserStore, RedisCache};
use roster_server::traits::{AuthApi, UserApi};
use roster_server::{logging, ShutdownController, TokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    logging::init(&config);
    info!(app = %config.app_name, env = %config.app_env, "starting http server");

    let pool = postgres::connect(&config.database.url).await?;
    postgres::migrate(&pool).await?;
    info!("database ready");

    let cache = Arc::new(RedisCache::connect(&config.redis.url).await?);
    let token = Arc::new(TokenService::new(config.token.parsed_duration()?));

    let store = Arc::new(PgUserStore::new(pool));
    let users: Arc<dyn UserApi> = Arc::new(UserService::new(store.clone(), cache));
    let auth: Arc<dyn AuthApi> = Arc::new(AuthService::new(store, token.clone()));

    let shutdown = Arc::new(ShutdownController::new());
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal.begin_cancel();
        }
    });

    shutdown.set_running();
    http::serve(&config.http, AppState { auth, users, token }, shutdown.subscribe()).await?;
    shutdown.set_stopped();

    Ok(())
}
