//! NDX Options Monitor front server.
//!
//! Serves the dashboard, proxies `/api` and supervises the backend process.

use ndx_options_monitor::api::create_router;
use ndx_options_monitor::config::Config;
use ndx_options_monitor::shutdown::shutdown_signal;
use ndx_options_monitor::state::AppState;
use ndx_options_monitor::supervisor::BackendSupervisor;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let grace = config.backend.shutdown_grace();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Start the backend; a launch failure leaves the server running
    let backend = if config.backend.spawn {
        BackendSupervisor::spawn(&config.backend).ok()
    } else {
        info!(
            "Backend supervision disabled, expecting backend at {}",
            config.backend.origin()
        );
        None
    };

    let state = Arc::new(AppState::new(config)?);
    info!(
        "Serving {} and proxying /api to {}",
        state.config.server.static_dir.display(),
        state.backend_origin
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let listener = TcpListener::bind(&addr).await?;
    info!("Frontend server running on {}", addr);

    let signal_backend = backend.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal = shutdown_signal().await;
            info!("{} received, shutting down gracefully...", signal);
            if let Some(backend) = &signal_backend {
                backend.forward(signal);
            }
        })
        .await?;

    if let Some(backend) = backend {
        match backend.wait_for_exit(grace).await {
            Some(exit) => info!("Backend stopped with code {:?}", exit.code),
            None => warn!("Backend exit status unavailable"),
        }
    }

    Ok(())
}
