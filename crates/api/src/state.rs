//! Application state shared across handlers (`SPEC_FULL.md` §4.8).
//!
//! Generalizes the teacher's `AppContext` (one struct wiring every service
//! together at startup, handed to Tauri commands as managed state) into an
//! `axum` `State` extension bundling the concrete adapters behind the
//! core's ports.

use std::sync::Arc;

use oauthbroker_core::{
    CallbackSecurityService, IntegrationRepository, OAuthProtocolService, OAuthServices,
    ProviderCatalog, SecurityMonitoringService,
};
use oauthbroker_core::oauth::crypto::SecretCipher;
use oauthbroker_domain::config::BrokerConfig;

/// Everything a handler needs: the core's services plus the broker-wide
/// configuration (for redirect-host validation and environment gating).
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn IntegrationRepository>,
    pub catalog: Arc<dyn ProviderCatalog>,
    pub protocol: Arc<dyn OAuthProtocolService>,
    pub cipher: Arc<dyn SecretCipher>,
    pub security: Arc<CallbackSecurityService>,
    pub monitoring: Arc<SecurityMonitoringService>,
    pub config: Arc<BrokerConfig>,
}

impl AppState {
    /// Borrow everything `oauthbroker-core`'s pipeline functions need as one
    /// value, mirroring `OAuthServices`'s own "pass one value instead of
    /// five" rationale.
    #[must_use]
    pub fn services(&self) -> OAuthServices<'_> {
        OAuthServices {
            repository: self.repository.as_ref(),
            catalog: self.catalog.as_ref(),
            protocol: self.protocol.as_ref(),
            cipher: self.cipher.as_ref(),
            security: self.security.as_ref(),
            monitoring: self.monitoring.as_ref(),
        }
    }
}
