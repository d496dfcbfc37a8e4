//! Broker-facing entry point: consumes request envelopes from the input
//! queue and publishes correlated response envelopes.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use roster_server::config::AppConfig;
use roster_server::rmq::{Consumer, Dispatcher};
use roster_server::service::{AuthService, UserService};
use roster_server::storage::{postgres, PgUserStore, RedisCache};
use roster_server::traits::{AuthApi, UserApi};
use roster_server::{logging, ShutdownController, TokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    logging::init(&config);
    info!(app = %config.app_name, env = %config.app_env, "starting broker consumer");

    let pool = postgres::connect(&config.database.url).await?;
    postgres::migrate(&pool).await?;
    info!("database ready");

    let cache = Arc::new(RedisCache::connect(&config.redis.url).await?);
    let token = Arc::new(TokenService::new(config.token.parsed_duration()?));

    let store = Arc::new(PgUserStore::new(pool));
    let users: Arc<dyn UserApi> = Arc::new(UserService::new(store.clone(), cache));
    let auth: Arc<dyn AuthApi> = Arc::new(AuthService::new(store, token));

    let shutdown = Arc::new(ShutdownController::new());
    let consumer = Consumer::connect(
        config.rmq.clone(),
        Dispatcher::new(auth, users),
        shutdown.clone(),
    )
    .await?;

    let mut consume = tokio::spawn(consumer.run());

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown signal received");
            shutdown.begin_cancel();
            (&mut consume).await??;
        }
        joined = &mut consume => {
            joined??;
        }
    }

    Ok(())
}
