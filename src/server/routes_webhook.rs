use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use mediabot_common::ContentRef;
use serde_json::json;

use crate::server::auth::verify_webhook_signature;
use crate::server::rate_limit::{create_limiter, rate_limit_middleware};
use crate::server::AppContext;

pub const SIGNATURE_HEADER: &str = "x-mediabot-signature";

pub fn webhook_routes(ctx: &AppContext) -> Router<AppContext> {
    let router = Router::new().route("/content", post(handle_content_created));

    match create_limiter(ctx.config.server.webhook_rate_per_minute) {
        Some(limiter) => router
            .layer(middleware::from_fn(rate_limit_middleware))
            .layer(Extension(limiter)),
        None => router,
    }
}

async fn handle_content_created(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(ref secret) = ctx.config.server.webhook_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    format!("Missing {} header", SIGNATURE_HEADER),
                )
            })?;

        if !verify_webhook_signature(secret, &body, signature) {
            tracing::warn!("Webhook signature verification failed");
            return Err((StatusCode::UNAUTHORIZED, "Invalid signature".to_string()));
        }
    }

    let content: ContentRef = serde_json::from_slice(&body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid content payload: {}", e),
        )
    })?;

    if !ctx.settings.read().bot.enabled {
        tracing::debug!(content = %content, "Bot disabled, ignoring content");
        return Ok((
            StatusCode::OK,
            Json(json!({"queued": false, "reason": "disabled"})),
        ));
    }

    ctx.queue.submit(content).await.map_err(|e| {
        tracing::error!(content = %content, error = %e, "Failed to queue lookup");
        (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })?;

    Ok((StatusCode::ACCEPTED, Json(json!({"queued": true}))))
}
