//! SQLCipher-backed integration store (C3, `spec.md` §4.3).
//!
//! Implements `IntegrationRepository` and `ProviderCatalog` against the
//! `cloud_provider_integrations`/`cloud_providers` tables, following the same
//! `spawn_blocking` idiom as `SqlCipherFeatureFlagsRepository`: every
//! database call runs on a blocking thread and the port trait itself is a
//! thin async shim over synchronous rusqlite calls.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauthbroker_common::storage::sqlcipher::SqlCipherConnection;
use oauthbroker_common::storage::StorageError;
use oauthbroker_core::oauth::store::{IntegrationRepository, ProviderCatalog};
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::integration::{
    CloudProviderIntegration, FlowContext, FlowStatus, IntegrationStatus, PkceContext, PkceMethod,
    TokenMaterial,
};
use oauthbroker_domain::provider::{CloudProvider, ProviderCapabilities};
use oauthbroker_domain::ObjectId;
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;

/// SQLCipher-backed [`IntegrationRepository`].
pub struct SqliteIntegrationStore {
    db: Arc<DbManager>,
}

impl SqliteIntegrationStore {
    #[must_use]
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IntegrationRepository for SqliteIntegrationStore {
    async fn find_by_id(
        &self,
        tenant_id: &ObjectId,
        integration_id: &ObjectId,
    ) -> Result<Option<CloudProviderIntegration>, OAuthCallbackError> {
        let db = Arc::clone(&self.db);
        let tenant_id = tenant_id.to_string();
        let integration_id = integration_id.to_string();

        task::spawn_blocking(move || -> Result<Option<CloudProviderIntegration>, StorageError> {
            let conn = db.get_connection().map_err(|e| StorageError::DatabaseError(e.to_string()))?;
            query_integration(&conn, &tenant_id, &integration_id)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_storage_error)
    }

    async fn save(&self, integration: &CloudProviderIntegration) -> Result<(), OAuthCallbackError> {
        let db = Arc::clone(&self.db);
        let integration = integration.clone();

        task::spawn_blocking(move || -> Result<(), StorageError> {
            let conn = db.get_connection().map_err(|e| StorageError::DatabaseError(e.to_string()))?;
            upsert_integration(&conn, &integration)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_storage_error)
    }

    async fn clear_flow(
        &self,
        tenant_id: &ObjectId,
        integration_id: &ObjectId,
    ) -> Result<(), OAuthCallbackError> {
        let db = Arc::clone(&self.db);
        let tenant_id = tenant_id.to_string();
        let integration_id = integration_id.to_string();

        task::spawn_blocking(move || -> Result<(), StorageError> {
            let conn = db.get_connection().map_err(|e| StorageError::DatabaseError(e.to_string()))?;
            clear_flow_columns(&conn, &tenant_id, &integration_id)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_storage_error)
    }
}

/// Read-only [`ProviderCatalog`] over the `cloud_providers` table.
pub struct SqliteProviderCatalog {
    db: Arc<DbManager>,
}

impl SqliteProviderCatalog {
    #[must_use]
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProviderCatalog for SqliteProviderCatalog {
    async fn find_by_id(&self, provider_id: &ObjectId) -> Result<Option<CloudProvider>, OAuthCallbackError> {
        let db = Arc::clone(&self.db);
        let provider_id = provider_id.to_string();

        task::spawn_blocking(move || -> Result<Option<CloudProvider>, StorageError> {
            let conn = db.get_connection().map_err(|e| StorageError::DatabaseError(e.to_string()))?;
            query_provider(&conn, "id", &provider_id)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_storage_error)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CloudProvider>, OAuthCallbackError> {
        let db = Arc::clone(&self.db);
        let slug = slug.to_string();

        task::spawn_blocking(move || -> Result<Option<CloudProvider>, StorageError> {
            let conn = db.get_connection().map_err(|e| StorageError::DatabaseError(e.to_string()))?;
            query_provider(&conn, "slug", &slug)
        })
        .await
        .map_err(map_join_error)?
        .map_err(map_storage_error)
    }
}

// ============================================================================
// Synchronous SQL operations (called inside spawn_blocking)
// ============================================================================

const INTEGRATION_COLUMNS: &str = "id, tenant_id, provider_id, status, \
    access_token_encrypted, refresh_token_encrypted, tokens_expires_at, scopes_granted, \
    pkce_code_verifier_encrypted, pkce_code_challenge, pkce_code_challenge_method, \
    flow_id, flow_nonce, flow_state_hash, flow_pkce_verifier_encrypted, flow_status, \
    flow_created_at, flow_expires_at, \
    created_at, updated_at, created_by, updated_by";

fn query_integration(
    conn: &SqlCipherConnection,
    tenant_id: &str,
    integration_id: &str,
) -> Result<Option<CloudProviderIntegration>, StorageError> {
    let sql = format!(
        "SELECT {INTEGRATION_COLUMNS} FROM cloud_provider_integrations \
         WHERE id = ?1 AND tenant_id = ?2"
    );
    match conn.query_row(&sql, params![integration_id, tenant_id], row_to_integration) {
        Ok(integration) => Ok(Some(integration)),
        Err(StorageError::Rusqlite(rusqlite::Error::QueryReturnedNoRows)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn upsert_integration(
    conn: &SqlCipherConnection,
    integration: &CloudProviderIntegration,
) -> Result<(), StorageError> {
    let status = integration.status.to_string();
    let scopes_granted = integration
        .tokens
        .as_ref()
        .map(|t| serde_json::to_string(&t.scopes_granted).unwrap_or_else(|_| "[]".to_string()))
        .unwrap_or_else(|| "[]".to_string());

    conn.execute(
        "INSERT INTO cloud_provider_integrations (
            id, tenant_id, provider_id, status,
            access_token_encrypted, refresh_token_encrypted, tokens_expires_at, scopes_granted,
            pkce_code_verifier_encrypted, pkce_code_challenge, pkce_code_challenge_method,
            flow_id, flow_nonce, flow_state_hash, flow_pkce_verifier_encrypted, flow_status,
            flow_created_at, flow_expires_at,
            created_at, updated_at, created_by, updated_by
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7, ?8,
            ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16,
            ?17, ?18,
            ?19, ?20, ?21, ?22
        )
        ON CONFLICT(id) DO UPDATE SET
            status = excluded.status,
            access_token_encrypted = excluded.access_token_encrypted,
            refresh_token_encrypted = excluded.refresh_token_encrypted,
            tokens_expires_at = excluded.tokens_expires_at,
            scopes_granted = excluded.scopes_granted,
            pkce_code_verifier_encrypted = excluded.pkce_code_verifier_encrypted,
            pkce_code_challenge = excluded.pkce_code_challenge,
            pkce_code_challenge_method = excluded.pkce_code_challenge_method,
            flow_id = excluded.flow_id,
            flow_nonce = excluded.flow_nonce,
            flow_state_hash = excluded.flow_state_hash,
            flow_pkce_verifier_encrypted = excluded.flow_pkce_verifier_encrypted,
            flow_status = excluded.flow_status,
            flow_created_at = excluded.flow_created_at,
            flow_expires_at = excluded.flow_expires_at,
            updated_at = excluded.updated_at,
            updated_by = excluded.updated_by",
        params![
            integration.id.to_string(),
            integration.tenant_id.to_string(),
            integration.provider_id.to_string(),
            status,
            integration.tokens.as_ref().map(|t| t.access_token_encrypted.clone()),
            integration.tokens.as_ref().and_then(|t| t.refresh_token_encrypted.clone()),
            integration.tokens.as_ref().map(|t| t.expires_at.to_rfc3339()),
            scopes_granted,
            integration.pkce.as_ref().map(|p| p.code_verifier_encrypted.clone()),
            integration.pkce.as_ref().map(|p| p.code_challenge.clone()),
            integration.pkce.as_ref().map(|p| p.code_challenge_method.to_string()),
            integration.flow.as_ref().map(|f| f.flow_id.clone()),
            integration.flow.as_ref().map(|f| f.nonce.clone()),
            integration.flow.as_ref().map(|f| f.state_hash.clone()),
            integration.flow.as_ref().and_then(|f| f.pkce_verifier_encrypted.clone()),
            integration.flow.as_ref().map(|f| flow_status_str(f.status)),
            integration.flow.as_ref().map(|f| f.created_at.to_rfc3339()),
            integration.flow.as_ref().map(|f| f.expires_at.to_rfc3339()),
            integration.created_at.to_rfc3339(),
            integration.updated_at.to_rfc3339(),
            integration.created_by.to_string(),
            integration.updated_by.to_string(),
        ],
    )?;
    Ok(())
}

fn clear_flow_columns(
    conn: &SqlCipherConnection,
    tenant_id: &str,
    integration_id: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE cloud_provider_integrations SET
            flow_id = NULL, flow_nonce = NULL, flow_state_hash = NULL,
            flow_pkce_verifier_encrypted = NULL, flow_status = NULL,
            flow_created_at = NULL, flow_expires_at = NULL,
            pkce_code_verifier_encrypted = NULL, pkce_code_challenge = NULL,
            pkce_code_challenge_method = NULL
         WHERE id = ?1 AND tenant_id = ?2",
        params![integration_id, tenant_id],
    )?;
    Ok(())
}

fn query_provider(
    conn: &SqlCipherConnection,
    by: &str,
    value: &str,
) -> Result<Option<CloudProvider>, StorageError> {
    let column = match by {
        "id" => "id",
        _ => "slug",
    };
    let sql = format!(
        "SELECT id, name, slug, authorization_url, token_url, grant_type, \
         registered_redirect_uri, default_scopes, client_id, client_secret, active, capabilities \
         FROM cloud_providers WHERE {column} = ?1"
    );
    match conn.query_row(&sql, params![value], row_to_provider) {
        Ok(provider) => Ok(Some(provider)),
        Err(StorageError::Rusqlite(rusqlite::Error::QueryReturnedNoRows)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn row_to_integration(row: &Row<'_>) -> rusqlite::Result<CloudProviderIntegration> {
    let id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let provider_id: String = row.get(2)?;
    let status: String = row.get(3)?;

    let access_token_encrypted: Option<String> = row.get(4)?;
    let refresh_token_encrypted: Option<String> = row.get(5)?;
    let tokens_expires_at: Option<String> = row.get(6)?;
    let scopes_granted_json: String = row.get(7)?;

    let pkce_code_verifier_encrypted: Option<String> = row.get(8)?;
    let pkce_code_challenge: Option<String> = row.get(9)?;
    let pkce_code_challenge_method: Option<String> = row.get(10)?;

    let flow_id: Option<String> = row.get(11)?;
    let flow_nonce: Option<String> = row.get(12)?;
    let flow_state_hash: Option<String> = row.get(13)?;
    let flow_pkce_verifier_encrypted: Option<String> = row.get(14)?;
    let flow_status: Option<String> = row.get(15)?;
    let flow_created_at: Option<String> = row.get(16)?;
    let flow_expires_at: Option<String> = row.get(17)?;

    let created_at: String = row.get(18)?;
    let updated_at: String = row.get(19)?;
    let created_by: String = row.get(20)?;
    let updated_by: String = row.get(21)?;

    let tokens = access_token_encrypted.map(|access_token_encrypted| TokenMaterial {
        access_token_encrypted,
        refresh_token_encrypted,
        expires_at: tokens_expires_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .unwrap_or(Some(Utc::now()))
            .unwrap_or_else(Utc::now),
        scopes_granted: serde_json::from_str(&scopes_granted_json).unwrap_or_default(),
    });

    let pkce = pkce_code_challenge.map(|code_challenge| PkceContext {
        code_verifier_encrypted: pkce_code_verifier_encrypted.unwrap_or_default(),
        code_challenge,
        code_challenge_method: parse_pkce_method(pkce_code_challenge_method.as_deref()),
    });

    let flow = flow_id.map(|flow_id| FlowContext {
        flow_id,
        nonce: flow_nonce.unwrap_or_default(),
        state_hash: flow_state_hash.unwrap_or_default(),
        pkce_verifier_encrypted: flow_pkce_verifier_encrypted,
        status: parse_flow_status(flow_status.as_deref()),
        created_at: flow_created_at.as_deref().map(parse_timestamp).transpose().ok().flatten().unwrap_or_else(Utc::now),
        expires_at: flow_expires_at.as_deref().map(parse_timestamp).transpose().ok().flatten().unwrap_or_else(Utc::now),
    });

    Ok(CloudProviderIntegration {
        id: object_id(&id),
        tenant_id: object_id(&tenant_id),
        provider_id: object_id(&provider_id),
        status: parse_integration_status(&status),
        tokens,
        pkce,
        flow,
        created_at: parse_timestamp(&created_at).unwrap_or_else(|_| Utc::now()),
        updated_at: parse_timestamp(&updated_at).unwrap_or_else(|_| Utc::now()),
        created_by: object_id(&created_by),
        updated_by: object_id(&updated_by),
    })
}

fn row_to_provider(row: &Row<'_>) -> rusqlite::Result<CloudProvider> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let slug: String = row.get(2)?;
    let authorization_url: String = row.get(3)?;
    let token_url: String = row.get(4)?;
    let grant_type: String = row.get(5)?;
    let registered_redirect_uri: String = row.get(6)?;
    let default_scopes_json: String = row.get(7)?;
    let client_id: String = row.get(8)?;
    let client_secret: String = row.get(9)?;
    let active: i64 = row.get(10)?;
    let capabilities_json: String = row.get(11)?;

    Ok(CloudProvider {
        id: object_id(&id),
        name,
        slug,
        authorization_url,
        token_url,
        grant_type,
        registered_redirect_uri,
        default_scopes: serde_json::from_str(&default_scopes_json).unwrap_or_default(),
        client_id,
        client_secret,
        active: active != 0,
        capabilities: serde_json::from_str::<ProviderCapabilities>(&capabilities_json)
            .unwrap_or_default(),
    })
}

fn object_id(value: &str) -> ObjectId {
    ObjectId::from_str(value).unwrap_or_else(|_| {
        panic!("stored id `{value}` is not a valid ObjectId - database invariant violated")
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

fn parse_integration_status(value: &str) -> IntegrationStatus {
    match value {
        "active" => IntegrationStatus::Active,
        "expired" => IntegrationStatus::Expired,
        "revoked" => IntegrationStatus::Revoked,
        "error" => IntegrationStatus::Error,
        _ => IntegrationStatus::Idle,
    }
}

fn flow_status_str(status: FlowStatus) -> &'static str {
    match status {
        FlowStatus::Idle => "idle",
        FlowStatus::Pending => "pending",
        FlowStatus::Completed => "completed",
        FlowStatus::Failed => "failed",
    }
}

fn parse_flow_status(value: Option<&str>) -> FlowStatus {
    match value {
        Some("pending") => FlowStatus::Pending,
        Some("completed") => FlowStatus::Completed,
        Some("failed") => FlowStatus::Failed,
        _ => FlowStatus::Idle,
    }
}

fn parse_pkce_method(value: Option<&str>) -> PkceMethod {
    match value {
        Some("plain") => PkceMethod::Plain,
        _ => PkceMethod::S256,
    }
}

fn map_join_error(err: task::JoinError) -> OAuthCallbackError {
    tracing::warn!(error = %err, "blocking database task failed");
    OAuthCallbackError::InternalError
}

fn map_storage_error(err: StorageError) -> OAuthCallbackError {
    tracing::warn!(error = %err, "integration store operation failed");
    OAuthCallbackError::InternalError
}

// ============================================================================
// Tests
// ============================================================================
