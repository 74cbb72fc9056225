//! Integration Store port (C3, `spec.md` §4.3).
//!
//! `IntegrationRepository` is a trait-per-aggregate port, mirroring the
//! teacher's calendar/SAP port modules: the core depends only on this trait,
//! never on `rusqlite` or any concrete storage crate directly.

use async_trait::async_trait;
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::integration::CloudProviderIntegration;
use oauthbroker_domain::provider::CloudProvider;
use oauthbroker_domain::ObjectId;

/// Persistence port for [`CloudProviderIntegration`] aggregates, scoped by
/// tenant on every read to enforce multi-tenant isolation at the boundary
/// (`spec.md` §8 property 3).
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// Looks up an integration by id, scoped to `tenant_id`. Returns `Ok(None)`
    /// rather than an error when the id exists under a different tenant —
    /// callers must treat that identically to "not found".
    async fn find_by_id(
        &self,
        tenant_id: &ObjectId,
        integration_id: &ObjectId,
    ) -> Result<Option<CloudProviderIntegration>, OAuthCallbackError>;

    async fn save(&self, integration: &CloudProviderIntegration) -> Result<(), OAuthCallbackError>;

    /// Clears `flow` and `pkce` back to `None` (`spec.md` §4.4 reset step).
    async fn clear_flow(
        &self,
        tenant_id: &ObjectId,
        integration_id: &ObjectId,
    ) -> Result<(), OAuthCallbackError>;
}

/// Read-only access to the external cloud-provider catalog (`spec.md` §3).
#[async_trait]
pub trait ProviderCatalog: Send + Sync {
    async fn find_by_id(&self, provider_id: &ObjectId) -> Result<Option<CloudProvider>, OAuthCallbackError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CloudProvider>, OAuthCallbackError>;
}
