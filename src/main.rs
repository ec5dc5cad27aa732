// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{future::IntoFuture, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::monitor_service::MonitorService;
use crate::application::session_store::SessionStore;
use crate::infrastructure::chart_renderer::ChartRenderer;
use crate::infrastructure::config::{GreenhouseConfigFile, load_settings};
use crate::infrastructure::source_factory::DefaultSourceFactory;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_plant, get_controls, get_dashboard, get_status, health_check, list_plants, reconnect,
    remove_plant, update_controls,
};

// Single thread: the render loop is the only writer of sample windows
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = load_settings().context("loading monitor settings")?;
    let greenhouse = Arc::new(GreenhouseConfigFile::new(settings.greenhouse_file.clone()));

    // Fail early on a missing or broken greenhouse document
    let session = greenhouse.load_session().await?;
    tracing::info!(
        path = %greenhouse.path().display(),
        plants = ?session.plants(),
        sensors = ?session.sensors(),
        "loaded greenhouse configuration"
    );

    // Wire the render loop (application layer)
    let (controls_tx, controls_rx) = watch::channel(settings.initial_controls());
    let (renderer, dashboard_rx, status_rx) = ChartRenderer::channel();
    let monitor = MonitorService::new(
        greenhouse.clone(),
        Arc::new(DefaultSourceFactory::new(settings.source.clone())),
        renderer,
        controls_rx,
    );

    let state = Arc::new(AppState {
        greenhouse,
        controls: controls_tx,
        dashboard: dashboard_rx,
        status: status_rx,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/plants", get(list_plants).post(add_plant))
        .route("/plants/:name", delete(remove_plant))
        .route("/controls", get(get_controls).put(update_controls))
        .route("/reconnect", post(reconnect))
        .route("/dashboard", get(get_dashboard))
        .route("/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = settings
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.server.bind))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "starting greenhouse monitor");

    tokio::select! {
        served = axum::serve(listener, router).into_future() => served?,
        state = monitor.run() => tracing::info!(?state, "render loop stopped"),
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
