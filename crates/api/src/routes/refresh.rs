//! `POST /api/v1/oauth/tenants/:tenantId/integrations/:integrationId/refresh` (C6, `spec.md` §4.6).

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::Json;
use oauthbroker_domain::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::guards::TenantOwner;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RefreshBody {
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
pub struct RefreshResponseBody {
    #[serde(flatten)]
    integration: oauthbroker_domain::integration::IntegrationView,
}

pub async fn handle(
    State(app): State<AppState>,
    _owner: TenantOwner,
    Path((tenant_id, integration_id)): Path<(String, String)>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<RefreshResponseBody>, ApiError> {
    let tenant_id = ObjectId::from_str(&tenant_id).map_err(ApiError::Callback)?;
    let integration_id = ObjectId::from_str(&integration_id).map_err(ApiError::Callback)?;

    let services = app.services();
    let response = oauthbroker_core::refresh(&services, &tenant_id, &integration_id, body.force).await?;

    Ok(Json(RefreshResponseBody { integration: response.integration }))
}
