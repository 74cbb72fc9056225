//! In-memory test doubles for the integration/provider ports (`spec.md` §3).
//!
//! Generalizes the `InMemoryRepo`/`StaticCatalog` fixtures each pipeline test
//! module used to define for itself, the same way the teacher's
//! `oauthbroker_common::testing::mocks` module hosts shared fakes rather than
//! letting every test file redefine `MockHttpClient`. Exposed unconditionally
//! (not behind `#[cfg(test)]`) so `oauthbroker-api`'s integration tests can
//! depend on it too.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::integration::CloudProviderIntegration;
use oauthbroker_domain::provider::CloudProvider;
use oauthbroker_domain::ObjectId;

use super::store::{IntegrationRepository, ProviderCatalog};

/// In-memory [`IntegrationRepository`], keyed by integration id.
#[derive(Default)]
pub struct InMemoryIntegrationStore {
    integrations: Mutex<HashMap<String, CloudProviderIntegration>>,
}

impl InMemoryIntegrationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an integration directly, bypassing `save`.
    pub fn seed(&self, integration: CloudProviderIntegration) {
        self.integrations.lock().unwrap().insert(integration.id.as_str().to_string(), integration);
    }
}

#[async_trait]
impl IntegrationRepository for InMemoryIntegrationStore {
    async fn find_by_id(
        &self,
        tenant_id: &ObjectId,
        integration_id: &ObjectId,
    ) -> Result<Option<CloudProviderIntegration>, OAuthCallbackError> {
        let map = self.integrations.lock().unwrap();
        Ok(map.get(integration_id.as_str()).filter(|i| &i.tenant_id == tenant_id).cloned())
    }

    async fn save(&self, integration: &CloudProviderIntegration) -> Result<(), OAuthCallbackError> {
        self.integrations
            .lock()
            .unwrap()
            .insert(integration.id.as_str().to_string(), integration.clone());
        Ok(())
    }

    async fn clear_flow(
        &self,
        tenant_id: &ObjectId,
        integration_id: &ObjectId,
    ) -> Result<(), OAuthCallbackError> {
        let mut map = self.integrations.lock().unwrap();
        if let Some(integration) = map.get_mut(integration_id.as_str()) {
            if &integration.tenant_id == tenant_id {
                integration.flow = None;
                integration.pkce = None;
            }
        }
        Ok(())
    }
}

/// In-memory [`ProviderCatalog`], keyed by provider id and slug.
#[derive(Default)]
pub struct InMemoryProviderCatalog {
    providers: Mutex<HashMap<String, CloudProvider>>,
}

impl InMemoryProviderCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, reachable by both its id and its slug.
    pub fn register(&self, provider: CloudProvider) {
        let mut map = self.providers.lock().unwrap();
        map.insert(provider.id.to_string(), provider.clone());
        map.insert(provider.slug.clone(), provider);
    }
}

#[async_trait]
impl ProviderCatalog for InMemoryProviderCatalog {
    async fn find_by_id(&self, provider_id: &ObjectId) -> Result<Option<CloudProvider>, OAuthCallbackError> {
        Ok(self.providers.lock().unwrap().get(provider_id.as_str()).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CloudProvider>, OAuthCallbackError> {
        Ok(self.providers.lock().unwrap().get(slug).cloned())
    }
}
