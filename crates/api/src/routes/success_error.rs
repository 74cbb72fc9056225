//! `GET /api/v1/oauth/success`, `GET /api/v1/oauth/error` (`spec.md` §4.8 HTTP
//! surface table) — minimal HTML pages that `postMessage` the outcome to an
//! opener window and auto-close.

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::Html;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(rename = "tenantId")]
    tenant_id: Option<String>,
    #[serde(rename = "integrationId")]
    integration_id: Option<String>,
}

pub async fn success(Query(query): Query<SuccessQuery>) -> Result<Html<String>, StatusCode> {
    let (tenant_id, integration_id) = match (query.tenant_id, query.integration_id) {
        (Some(t), Some(i)) => (t, i),
        _ => return Err(StatusCode::BAD_REQUEST),
    };

    Ok(Html(popup_page(&format!(
        r#"{{"status":"success","tenantId":{},"integrationId":{}}}"#,
        serde_json::to_string(&tenant_id).unwrap_or_default(),
        serde_json::to_string(&integration_id).unwrap_or_default(),
    ))))
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    message: Option<String>,
    code: Option<String>,
}

pub async fn error(Query(query): Query<ErrorQuery>) -> Html<String> {
    let message = query.message.unwrap_or_else(|| "An error occurred".to_string());
    let code = query.code.unwrap_or_default();

    Html(popup_page(&format!(
        r#"{{"status":"error","message":{},"code":{}}}"#,
        serde_json::to_string(&message).unwrap_or_default(),
        serde_json::to_string(&code).unwrap_or_default(),
    )))
}

/// Renders a minimal HTML page that posts `payload_json` to `window.opener`
/// and closes itself (`spec.md` §4.8: "render minimal HTML pages that
/// `postMessage` the outcome to an opener window and auto-close").
fn popup_page(payload_json: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"></head><body>\
         <script>\
         if (window.opener) {{ window.opener.postMessage({payload_json}, '*'); }}\
         window.close();\
         </script>\
         </body></html>"
    )
}
