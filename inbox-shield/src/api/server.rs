//! API Server - HTTP server for the check and report endpoints

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analysis::DomainChecker;
use crate::api::handlers::{self, AppState};

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(checker: DomainChecker, addr: String) -> Self {
        let state = Arc::new(AppState { checker });

        Self { state, addr }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        // Public API, callable from any origin
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let api_routes = Router::new()
            .route("/health", get(handlers::health))
            .route("/check/preview", post(handlers::check_preview))
            .route("/check/full", post(handlers::check_full))
            .route("/report", post(handlers::full_report))
            .route("/report/text", post(handlers::text_report));

        Router::new()
            .nest("/api", api_routes)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        info!("Starting API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
