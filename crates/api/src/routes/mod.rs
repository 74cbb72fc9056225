//! HTTP handlers, one module per pipeline (`spec.md` §4.8 HTTP surface table).

pub mod callback;
pub mod initiate;
pub mod refresh;
pub mod reset;
pub mod security;
pub mod success_error;

/// The inbound `Host` header, stripped of any port — used to derive the
/// callback redirect URI, always reconstructed as HTTPS regardless of the
/// inbound scheme (`spec.md` §4.4 step 7).
pub(crate) fn request_host(headers: &axum::http::HeaderMap) -> String {
    headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .map(|h| h.split(':').next().unwrap_or(h).to_string())
        .unwrap_or_default()
}
