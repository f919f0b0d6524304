//! HTTP server for the site and the demo API.
//!
//! Route fragments (pages, demo API, health) are merged into a single axum
//! app with request tracing. `start()` binds and spawns the server task;
//! `shutdown()` stops it gracefully.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::get;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::demo::DemoServices;
use crate::error::ServerError;
use crate::web::demo_api::{self, DemoApiState};
use crate::web::pages;
use crate::web::registry::SessionRegistry;

/// How often idle sessions are swept, at most.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

async fn health() -> &'static str {
    "OK"
}

/// Build the full application router.
pub fn build_router(state: DemoApiState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(pages::routes())
        .merge(demo_api::routes(state, max_upload_bytes))
        .fallback(pages::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
}

/// The site server.
pub struct WebServer {
    config: ServerConfig,
    state: DemoApiState,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    sweeper: Option<JoinHandle<()>>,
}

impl WebServer {
    pub fn new(config: ServerConfig, services: DemoServices) -> Self {
        let state = DemoApiState {
            registry: Arc::new(SessionRegistry::new(config.session_ttl)),
            services: Arc::new(services),
        };
        Self {
            config,
            state,
            local_addr: None,
            shutdown_tx: None,
            handle: None,
            sweeper: None,
        }
    }

    /// Session registry, for inspection.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.state.registry
    }

    /// Address actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listener, spawn the server and the session sweeper.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        let app = build_router(self.state.clone(), self.config.max_upload_bytes);

        let listener = tokio::net::TcpListener::bind(self.config.bind)
            .await
            .map_err(|e| ServerError::StartupFailed {
                reason: format!("Failed to bind to {}: {}", self.config.bind, e),
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::StartupFailed {
                reason: format!("Failed to read bound address: {}", e),
            })?;

        tracing::info!("EduAI site listening on http://{}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    tracing::info!("Web server shutting down");
                })
                .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        let interval = self.config.session_ttl.clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL);
        self.sweeper = Some(self.state.registry.spawn_sweeper(interval));
        self.handle = Some(handle);
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Wait for the server task to exit.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Signal graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.wait().await;
    }
}
