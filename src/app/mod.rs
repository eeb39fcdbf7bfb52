// App layer: HTTP surface over the record services and the dashboard aggregator.

pub mod error;
pub mod routes;

use crate::config::TrackerConfig;
use crate::core::{Aggregator, CatalogKind, CatalogService, EmployeeService, SessionService};
use crate::domain::ports::{Clock, DocumentStore};
use crate::utils::error::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const BANNER: &str = "Training Management Application Backend is running!";

/// Services shared by every handler. Cloning is cheap: each holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub employees: EmployeeService,
    pub sessions: SessionService,
    pub trainers: CatalogService,
    pub topics: CatalogService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            aggregator: Aggregator::new(store.clone(), clock),
            employees: EmployeeService::new(store.clone()),
            sessions: SessionService::new(store.clone()),
            trainers: CatalogService::new(store.clone(), CatalogKind::Trainer),
            topics: CatalogService::new(store, CatalogKind::Topic),
        }
    }
}

pub fn build_router(state: AppState, cors: bool) -> Router {
    let api = Router::new()
        .nest("/dashboard", routes::dashboard::router())
        .nest("/employees", routes::employees::router())
        .nest("/training-sessions", routes::sessions::router())
        .nest(
            "/training-topics",
            routes::catalog::router(state.topics.clone()),
        )
        .nest("/trainers", routes::catalog::router(state.trainers.clone()));

    let router = Router::new()
        .route("/", get(|| async { BANNER }))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: &TrackerConfig, state: AppState) -> Result<()> {
    let app = build_router(state, config.server.cors);

    let address = config.bind_address();
    tracing::info!("Binding to {}", address);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("🚀 Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
