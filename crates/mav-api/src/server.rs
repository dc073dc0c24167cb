//! Router assembly and server lifecycle.
//!
//! Requests to `/api/*` (except the Telegram webhook) flow through:
//! 1. Bearer-token authentication
//! 2. Position gate, where the route has one
//! 3. Handler

use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    handlers,
    middleware::{
        auth::authenticate,
        authz::{
            require_elevated_or_self, require_positions, RequireElevatedOrSelf, RequirePositions,
        },
    },
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/telegram/webhook",
            post(handlers::webhook::telegram_webhook),
        );

    let elevated_routes = Router::new()
        .route(
            "/api/agents/{agent_id}/position",
            get(handlers::agents::agent_position),
        )
        .route_layer(middleware::from_fn_with_state(
            RequireElevatedOrSelf {
                positions: state.positions.clone(),
                param: "agent_id",
            },
            require_elevated_or_self,
        ));

    let notify_routes = Router::new()
        .route(
            "/api/notifications/deal",
            post(handlers::notifications::post_deal),
        )
        .route_layer(middleware::from_fn_with_state(
            RequirePositions {
                positions: state.positions.clone(),
                allowed: state.notify_allowed.clone(),
            },
            require_positions,
        ));

    let authed_routes = Router::new()
        .route("/api/me", get(handlers::agents::me))
        .merge(elevated_routes)
        .merge(notify_routes)
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            authenticate,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until CTRL+C or SIGTERM.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received CTRL+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
