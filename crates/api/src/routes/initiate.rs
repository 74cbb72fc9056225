//! `POST /api/v1/oauth/tenants/:tenantId/integrations/:integrationId/initiate` (C5, `spec.md` §4.5).

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use oauthbroker_domain::ObjectId;

use crate::error::ApiError;
use crate::guards::TenantOwner;
use crate::state::AppState;

pub async fn handle(
    State(app): State<AppState>,
    owner: TenantOwner,
    Path((tenant_id, integration_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<oauthbroker_core::InitiateResponse>, ApiError> {
    let tenant_id = ObjectId::from_str(&tenant_id).map_err(ApiError::Callback)?;
    let integration_id = ObjectId::from_str(&integration_id).map_err(ApiError::Callback)?;
    let user_id = ObjectId::from_str(&owner.principal.user_id).map_err(ApiError::Callback)?;
    let request_host = super::request_host(&headers);

    let services = app.services();
    let response = oauthbroker_core::initiate(
        &services,
        &tenant_id,
        &integration_id,
        &user_id,
        &request_host,
        Utc::now(),
    )
    .await?;

    Ok(Json(response))
}
