use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::{PlannerConfig, ServerConfig};
use crate::engine::HttpAgentEngine;
use crate::pipeline::PipelineController;
use crate::store::{self, SessionStore};

/// The full application: JSON API under `/api`, the form page everywhere else
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(server.body_limit_kb).unwrap_or(usize::MAX / 1024) * 1024;

    Router::new()
        .nest("/api", api::router(state))
        .fallback_service(ServeDir::new(&server.static_dir))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: PlannerConfig) -> Result<()> {
    let engine = Arc::new(
        HttpAgentEngine::new(&config.engine).context("Failed to set up the crew engine client")?,
    );
    tracing::info!("Crew engine at {}", engine.kickoff_url());

    let store = Arc::new(SessionStore::new(Duration::from_secs(
        u64::from(config.session.idle_ttl_minutes) * 60,
    )));
    let purge = store::spawn_purge_task(
        store.clone(),
        Duration::from_secs(config.session.purge_interval_seconds.into()),
    );

    let state = AppState {
        store,
        pipeline: Arc::new(PipelineController::new(engine, config.engine.verbose)),
    };
    let app = app(state, &config.server);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.bind_address()))?;

    let served = match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert), Some(key)) => serve_tls(app, addr, cert, key).await,
        _ => serve(app, addr).await,
    };

    purge.abort();
    served
}

async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Travel planner running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

#[cfg(feature = "tls")]
async fn serve_tls(app: Router, addr: SocketAddr, cert: &str, key: &str) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {cert} / key {key}"))?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    tracing::info!("Travel planner running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Server error")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(app: Router, addr: SocketAddr, _cert: &str, _key: &str) -> Result<()> {
    tracing::warn!("TLS configured but this build has no `tls` feature; serving plain HTTP");
    serve(app, addr).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
