//! Synchronous HTTP transport.
//!
//! Thin layer over the same ports the broker dispatcher uses; domain
//! errors map to HTTP statuses through the shared classifier.

pub mod auth;
pub mod error;
pub mod users;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::HttpConfig;
use crate::token::TokenService;
use crate::traits::{AuthApi, UserApi};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthApi>,
    pub users: Arc<dyn UserApi>,
    pub token: Arc<TokenService>,
}

/// Assembles the router.
///
/// Routes:
/// - `POST /v1/users` -- register
/// - `POST /v1/users/login` -- login
/// - `GET /v1/users`, `GET /v1/users/{id}` -- authenticated reads
/// - `PUT /v1/users/{id}`, `DELETE /v1/users/{id}` -- admin writes
pub fn router(state: AppState, allowed_origins: &str) -> Router {
    let public = Router::new()
        .route("/", post(users::register))
        .route("/login", post(users::login));

    let protected = Router::new()
        .route("/", get(users::list_users))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .nest("/v1/users", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Binds the listener and serves until the shutdown signal fires.
///
/// # Errors
///
/// Bind failures are startup-fatal; serve errors propagate to the binary.
pub async fn serve(
    config: &HttpConfig,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let app = router(state, &config.allowed_origins);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;
    Ok(())
}
