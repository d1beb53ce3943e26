//! HTTP middleware
//!
//! Request counting for the metrics endpoint and security headers on
//! every response. The auth guards live in [`crate::auth::guard`] because
//! they are part of the token lifecycle, not generic plumbing.

pub mod security_headers;

pub use security_headers::security_headers_middleware;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::state::AppState;

/// Request counting middleware
///
/// Bumps the global counter and the per-endpoint count that `/metrics`
/// exposes. Recording happens off the request path.
pub async fn request_counter_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.increment_requests();

    let endpoint = normalize_endpoint(request.uri().path());
    let state_clone = state.clone();
    tokio::spawn(async move {
        state_clone.record_request(endpoint).await;
    });

    next.run(request).await
}

/// Normalize endpoint paths for consistent metrics
///
/// Replaces UUID and token segments with a placeholder so
/// `/v2/books/<uid>` counts as one endpoint regardless of which book was
/// fetched.
fn normalize_endpoint(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if is_uuid(seg) || is_action_token(seg) {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a segment looks like a signed action token (`payload.sig`)
fn is_action_token(s: &str) -> bool {
    s.len() > 40 && s.contains('.')
}

/// Check if a string looks like a UUID, hyphenated or bare-hex
fn is_uuid(s: &str) -> bool {
    match s.len() {
        36 => s.chars().enumerate().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        }),
        32 => s.chars().all(|c| c.is_ascii_hexdigit()),
        _ => false,
    }
}
