//! Admin API routes for the bot dashboard.
//!
//! - Current settings, per-service metrics and recent errors
//! - Partial settings updates, persisted to the config file when one is known
//! - Clearing metrics and the error log
//! - A one-off catalog lookup for checking API keys

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use mediabot_common::{Error, LookupRequest, Service};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use super::error::AppError;
use super::AppContext;
use crate::config::{persist, RuntimeSettings, SettingsUpdate};
use crate::metadata::MediaRecord;
use crate::monitor::{self, ErrorRecord, ServiceMetrics};

/// Errors shown on the dashboard.
const RECENT_ERRORS: usize = 50;

/// Hours of metrics shown on the dashboard.
const METRICS_HOURS: i64 = 24;

pub fn admin_routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/mediabot", get(get_dashboard))
        .route("/admin/mediabot/settings", put(update_settings))
        .route("/admin/mediabot/clear_metrics", post(clear_metrics))
        .route("/admin/mediabot/clear_errors", post(clear_errors))
        .route("/admin/mediabot/test_api", post(test_api))
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub settings: RuntimeSettings,
    pub metrics: BTreeMap<Service, ServiceMetrics>,
    pub errors: Vec<ErrorRecord>,
    /// Services with an API key configured
    pub available_services: Vec<Service>,
}

#[derive(Debug, Deserialize)]
pub struct TestApiRequest {
    pub service: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct TestApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MediaRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_dashboard(State(ctx): State<AppContext>) -> Json<DashboardResponse> {
    let range = chrono::Duration::hours(METRICS_HOURS);
    let metrics = Service::ALL
        .into_iter()
        .map(|service| (service, ctx.monitor.metrics(service, range)))
        .collect();

    Json(DashboardResponse {
        settings: ctx.settings.read().clone(),
        metrics,
        errors: ctx.errors.recent(RECENT_ERRORS),
        available_services: ctx.fetcher.registry().available(),
    })
}

async fn update_settings(
    State(ctx): State<AppContext>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    if update.is_empty() {
        return Err(Error::validation("No settings to update").into());
    }

    let mut settings = ctx.settings.write();
    let mut candidate = settings.clone();
    candidate.apply(&update)?;

    if let Some(ref path) = ctx.config_path {
        persist::update_settings(path, &candidate.bot, &candidate.display).map_err(|e| {
            Error::configuration(format!("Failed to persist settings: {e:#}"))
        })?;
    }

    *settings = candidate.clone();
    drop(settings);

    tracing::info!(
        enabled = candidate.bot.enabled,
        persisted = ctx.config_path.is_some(),
        "Bot settings updated"
    );

    Ok(Json(json!({
        "success": true,
        "settings": candidate,
    })))
}

async fn clear_metrics(State(ctx): State<AppContext>) -> impl IntoResponse {
    ctx.monitor.clear();
    tracing::info!("Performance metrics cleared");
    Json(json!({"success": true}))
}

async fn clear_errors(State(ctx): State<AppContext>) -> impl IntoResponse {
    let cleared = ctx.errors.clear();
    tracing::info!(cleared, "Error log cleared");
    Json(json!({"success": true, "cleared": cleared}))
}

/// Run one catalog lookup through the full fetch path (cache, limiter,
/// provider). Failures are recorded like any other lookup error.
async fn test_api(
    State(ctx): State<AppContext>,
    Json(payload): Json<TestApiRequest>,
) -> (StatusCode, Json<TestApiResponse>) {
    let locale = ctx.settings.read().locale.resolve(None);

    let result = match lookup_request(&payload, &locale) {
        Ok(request) => ctx.fetcher.fetch(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(data) => (
            StatusCode::OK,
            Json(TestApiResponse {
                success: true,
                data,
                error: None,
            }),
        ),
        Err(e) => {
            let message = ctx.errors.record(
                &e,
                monitor::context([
                    ("service", payload.service.clone()),
                    ("title", payload.title.clone()),
                ]),
                &locale,
            );
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(TestApiResponse {
                    success: false,
                    data: None,
                    error: Some(message),
                }),
            )
        }
    }
}

fn lookup_request(payload: &TestApiRequest, locale: &str) -> Result<LookupRequest, Error> {
    let service: Service = payload
        .service
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("Unknown service: {}", payload.service)))?;
    if payload.title.trim().is_empty() {
        return Err(Error::validation("Title must not be blank"));
    }

    Ok(LookupRequest::new(
        service.media_type(),
        payload.title.trim(),
        None,
        locale,
    ))
}
