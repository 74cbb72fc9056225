//! OAuth integration subsystem — the core's primary business logic
//! (`spec.md` §2). See `SPEC_FULL.md` §4 for the component breakdown this
//! module tree mirrors: `security` (C1), `protocol` (C2), `store` (C3),
//! `flows` (C4–C6), `monitoring` (C7).

pub mod audit;
pub mod crypto;
pub mod flows;
pub mod monitoring;
pub mod protocol;
pub mod security;
pub mod state_codec;
pub mod store;
pub mod testing;

pub use flows::{
    initiate, process_callback, refresh, reset, CallbackOutcome, CallbackParams, InitiateResponse,
    OAuthServices, RefreshResponse,
};
pub use monitoring::SecurityMonitoringService;
pub use protocol::{AuthorizationRequest, OAuthProtocolService, TokenResponse};
pub use security::{CallbackSecurityService, RequestContext};
pub use store::{IntegrationRepository, ProviderCatalog};
pub use testing::{InMemoryIntegrationStore, InMemoryProviderCatalog};
