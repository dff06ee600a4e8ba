use crate::config::{Config, RuntimeSettings, SharedSettings};
use crate::forum::{DiscourseForum, Forum};
use crate::jobs::{LookupQueue, LookupService};
use crate::metadata::{start_purge_task, Backends, Fetcher};
use crate::monitor::{ErrorLog, PerformanceMonitor};
use anyhow::{Context, Result};
use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
use mediabot_common::{Clock, SystemClock};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod routes_admin;
pub mod routes_webhook;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Path to config file (for persistence)
    pub config_path: Option<PathBuf>,
    /// Bot and display settings (can be edited via API)
    pub settings: SharedSettings,
    pub fetcher: Arc<Fetcher>,
    pub queue: LookupQueue,
    pub errors: Arc<ErrorLog>,
    pub monitor: Arc<PerformanceMonitor>,
}

impl AppContext {
    /// Wire the lookup pipeline for `config` around `forum`.
    ///
    /// Spawns the lookup queue, so this must run inside a Tokio runtime.
    pub fn build(
        config: Config,
        config_path: Option<PathBuf>,
        forum: Arc<dyn Forum>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let monitor = Arc::new(PerformanceMonitor::new(clock.clone()));
        let errors = Arc::new(ErrorLog::new(clock.clone()));
        let backends = Backends::from_config(&config, clock)?;
        let fetcher = Arc::new(backends.fetcher(&config, monitor.clone())?);
        let settings = RuntimeSettings::shared(&config);

        let service = LookupService::new(forum, fetcher.clone(), settings.clone(), errors.clone());
        let queue = LookupQueue::new(Arc::new(service));

        Ok(Self {
            config: Arc::new(config),
            config_path,
            settings,
            fetcher,
            queue,
            errors,
            monitor,
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(&ctx))
        .nest("/webhook", routes_webhook::webhook_routes(&ctx))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    let admin = routes_admin::admin_routes();

    if ctx.config.server.admin_api_key.is_some() {
        admin.layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::admin_auth_middleware,
        ))
    } else {
        tracing::warn!("No admin API key configured; admin routes are unauthenticated");
        admin
    }
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server, posting replies through the configured forum.
pub async fn start_server(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let forum = DiscourseForum::new(&config.forum).context("Failed to create forum client")?;
    let purge_interval = std::time::Duration::from_secs(config.cache.purge_interval_secs.max(1));

    let ctx = AppContext::build(config, config_path, Arc::new(forum), Arc::new(SystemClock))?;
    let purge_task = start_purge_task(ctx.fetcher.cache().clone(), purge_interval);

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge_task.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
