//! # OAuthBroker Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains the OAuth integration subsystem (`spec.md` §2):
//! - Callback security validation (state, nonce, ownership, PKCE, redirect URI)
//! - The OAuth protocol port (authorization URL construction, token exchange,
//!   refresh) plus its provider-error mapping table
//! - The integration/provider repository ports
//! - Pipeline orchestration for initiation, callback, refresh, and reset
//! - Security monitoring (attempt recording, pattern detection, alerting)
//!
//! ## Architecture Principles
//! - Only depends on `oauthbroker-common` and `oauthbroker-domain`
//! - No database, HTTP, or platform code — all external dependencies
//!   (storage, the provider's HTTP endpoints, the encryption key) are
//!   consumed through traits implemented in `oauthbroker-infra`
//! - Pure, testable business logic

pub mod oauth;

pub use oauth::{
    initiate, process_callback, refresh, reset, AuthorizationRequest, CallbackOutcome,
    CallbackParams, CallbackSecurityService, InMemoryIntegrationStore, InMemoryProviderCatalog,
    InitiateResponse, IntegrationRepository, OAuthProtocolService, OAuthServices, ProviderCatalog,
    RefreshResponse, RequestContext, SecurityMonitoringService, TokenResponse,
};
