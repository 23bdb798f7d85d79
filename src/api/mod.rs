//! HTTP layer - axum router, handlers, and server lifecycle.

/// Error to response mapping
pub mod error;
/// Endpoint handlers
pub mod handlers;

use crate::{context::AppContext, errors::Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

/// Page served at `/`, relative to the static directory.
pub const INDEX_PAGE: &str = "index.html";

/// Builds the API router.
pub fn create_router(ctx: AppContext) -> Router {
    let api_routes = Router::new()
        .route("/check-apartment/:number", get(handlers::check_apartment))
        .route("/vote", post(handlers::submit_vote))
        .route("/results", get(handlers::get_results))
        .route("/poll-status", get(handlers::get_poll_status));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(ctx)
}

/// Builds the API router plus the voting page at `/` and file serving under
/// `/static`, both from `static_dir`.
pub fn create_app(ctx: AppContext, static_dir: &Path) -> Router {
    create_router(ctx)
        .route_service("/", ServeFile::new(static_dir.join(INDEX_PAGE)))
        .nest_service("/static", ServeDir::new(static_dir))
}

/// Serves `app` on `0.0.0.0:port` until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, port: u16) -> Result<()> {
    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received terminate signal, shutting down"),
    }
}
