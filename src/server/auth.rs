//! Admin authentication and webhook signature checks.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::server::AppContext;

type HmacSha256 = Hmac<Sha256>;

/// Check a bearer token against the configured admin key. No key means the
/// admin routes are open.
fn check_admin(
    admin_api_key: Option<&str>,
    bearer_token: Option<&str>,
) -> Result<(), (StatusCode, &'static str)> {
    let Some(expected) = admin_api_key else {
        return Ok(());
    };

    match bearer_token {
        Some(token) if tokens_match(expected, token) => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "Authentication required")),
    }
}

/// Compare two secrets in constant time. Both sides are reduced to
/// fixed-size MACs first, so the token length is not observable either.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let Ok(mut reference) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    reference.update(expected.as_bytes());
    let reference = reference.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    mac.update(provided.as_bytes());
    mac.verify_slice(&reference).is_ok()
}

/// Middleware guarding the admin routes.
pub async fn admin_auth_middleware(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let bearer_token = bearer.as_ref().map(|b| b.token());
    check_admin(ctx.config.server.admin_api_key.as_deref(), bearer_token)?;
    Ok(next.run(request).await)
}

/// Generate a random webhook signature secret
pub fn generate_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Sign `body` the way webhook senders are expected to: `sha256=<hex>`.
pub fn sign_webhook(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify a webhook signature. The `sha256=` prefix is optional.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    let hex_sig = signature.strip_prefix("sha256=").unwrap_or(signature);
    let Ok(expected) = hex::decode(hex_sig.trim()) else {
        return false;
    };

    mac.verify_slice(&expected).is_ok()
}
