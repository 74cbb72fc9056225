//! `GET /api/v1/oauth/callback` (C4, `spec.md` §4.4).
//!
//! Never returns a raw error response — every outcome, success or failure,
//! becomes a redirect (`spec.md` §4.1 error response generator).

use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Utc;
use serde::Deserialize;
use std::net::SocketAddr;

use oauthbroker_core::oauth::audit;
use oauthbroker_core::{CallbackParams, RequestContext};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub async fn handle(
    State(app): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    audit::record_route_access("oauth.callback.route.access");

    let params = CallbackParams {
        code: query.code,
        state: query.state,
        error: query.error,
        error_description: query.error_description,
    };

    let ctx = RequestContext {
        ip: addr.ip().to_string(),
        user_agent: user_agent(&headers),
        now_ms: Utc::now().timestamp_millis(),
    };

    let request_host = super::request_host(&headers);
    let services = app.services();
    let outcome = oauthbroker_core::process_callback(&services, &params, &ctx, &request_host).await;

    let redirect_to = outcome.redirect_url(&app.security);
    Redirect::to(&redirect_to).into_response()
}

fn user_agent(headers: &HeaderMap) -> String {
    headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or("unknown").to_string()
}
