//! `POST /api/v1/oauth/tenants/:tenantId/integrations/:integrationId/reset` (`spec.md` §4.8).

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use oauthbroker_domain::ObjectId;
use serde::Serialize;

use crate::error::ApiError;
use crate::guards::TenantOwner;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResetResponseBody {
    success: bool,
}

pub async fn handle(
    State(app): State<AppState>,
    _owner: TenantOwner,
    Path((tenant_id, integration_id)): Path<(String, String)>,
) -> Result<Json<ResetResponseBody>, ApiError> {
    let tenant_id = ObjectId::from_str(&tenant_id).map_err(ApiError::Callback)?;
    let integration_id = ObjectId::from_str(&integration_id).map_err(ApiError::Callback)?;

    let services = app.services();
    oauthbroker_core::reset(&services, &tenant_id, &integration_id).await?;

    Ok(Json(ResetResponseBody { success: true }))
}
