//! Authorization guards (C8, `spec.md` §4.8).
//!
//! `spec.md` §1 scopes authenticating platform users out of this system —
//! "the core receives an already-authenticated principal for protected
//! endpoints." The gateway in front of this service is expected to populate
//! the `X-Principal-*` headers below after doing that authentication; these
//! extractors only enforce the *authorization* guard (tenant ownership,
//! super-admin), the idiomatic `axum` replacement for the source's thrown
//! `ApiError` guard functions.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::collections::HashMap;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-principal-user-id";
const TENANT_IDS_HEADER: &str = "x-principal-tenant-ids";
const SUPER_ADMIN_HEADER: &str = "x-principal-super-admin";

/// The already-authenticated principal passed down from the gateway.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub user_id: String,
    pub owned_tenant_ids: Vec<String>,
    pub super_admin: bool,
}

impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::Unauthenticated)?
            .to_string();

        let owned_tenant_ids = parts
            .headers
            .get(TENANT_IDS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        let super_admin = parts
            .headers
            .get(SUPER_ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self { user_id, owned_tenant_ids, super_admin })
    }
}

/// Proof that the caller owns the `:tenantId` path segment, or is a
/// super-admin (`spec.md` §4.8 "tenant owner, or a platform super-admin").
#[derive(Debug, Clone)]
pub struct TenantOwner {
    pub principal: AuthPrincipal,
    pub tenant_id: String,
}

impl<S> FromRequestParts<S> for TenantOwner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = AuthPrincipal::from_request_parts(parts, state).await?;
        let path_params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Forbidden)?;
        let tenant_id = path_params.get("tenantId").cloned().ok_or(ApiError::Forbidden)?;

        if principal.super_admin || principal.owned_tenant_ids.iter().any(|t| t == &tenant_id) {
            return Ok(Self { principal, tenant_id });
        }
        Err(ApiError::Forbidden)
    }
}

/// Proof that the caller is a platform super-admin (`spec.md` §4.8
/// administrative routes).
#[derive(Debug, Clone)]
pub struct SuperAdmin {
    pub principal: AuthPrincipal,
}

impl<S> FromRequestParts<S> for SuperAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = AuthPrincipal::from_request_parts(parts, state).await?;
        if principal.super_admin {
            return Ok(Self { principal });
        }
        Err(ApiError::Forbidden)
    }
}
