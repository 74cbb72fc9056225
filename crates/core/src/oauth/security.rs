//! Callback Security Service (C1, `spec.md` §4.1).
//!
//! Small, independently unit-testable pure functions plus one orchestrating
//! struct, mirroring the teacher's `auth::pkce` style (free functions) paired
//! with `PKCEChallenge::generate` (one struct tying them together).
//! `CallbackSecurityService` holds no mutable state: it is `Clone + Send +
//! Sync`, constructed once at startup from [`RedirectPolicy`].

use std::time::Duration;

use oauthbroker_common::auth::pkce::generate_code_challenge;
use oauthbroker_domain::config::RedirectPolicy;
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::integration::{CloudProviderIntegration, IntegrationStatus, PkceContext, PkceMethod};
use oauthbroker_domain::provider::CloudProvider;
use oauthbroker_domain::state::StateParameter;

use super::state_codec::{compute_state_hash, decode_state};

/// Upper bound on how stale a state parameter may be (`spec.md` §4.1).
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Request-scoped context carried through validation, used only for audit
/// correlation — never as a trust signal by itself.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub ip: String,
    pub user_agent: String,
    pub now_ms: i64,
}

/// Validates the raw state string structurally and temporally. Does not
/// touch storage or the network (`spec.md` §8 property 1).
pub fn validate_state(
    raw_state: &str,
    ctx: &RequestContext,
) -> Result<StateParameter, OAuthCallbackError> {
    let state = decode_state(raw_state)?;

    if !state.has_valid_nonce() {
        return Err(OAuthCallbackError::InvalidNonce);
    }

    let age_ms = ctx.now_ms - state.timestamp;
    if age_ms < 0 || age_ms > STATE_TTL.as_millis() as i64 {
        return Err(OAuthCallbackError::StateExpired);
    }

    Ok(state)
}

/// Verifies that the decoded state refers to an integration the caller is
/// entitled to act on, and that it isn't already a live connection
/// (`spec.md` §4.1 "Integration ownership verification").
///
/// `integration`/`provider` are `None` when the repository lookup found
/// nothing for `(integrationId, tenantId)` — the only lookup path the
/// callback pipeline uses, which already enforces tenant scoping.
pub fn verify_ownership(
    state: &StateParameter,
    integration: Option<&CloudProviderIntegration>,
    provider: Option<&CloudProvider>,
) -> Result<(), OAuthCallbackError> {
    let integration = integration.ok_or(OAuthCallbackError::IntegrationNotFound)?;

    if integration.has_live_access_token() {
        return Err(OAuthCallbackError::AlreadyConfigured);
    }

    let provider = provider.ok_or(OAuthCallbackError::ProviderUnavailable)?;
    if !provider.active {
        return Err(OAuthCallbackError::ProviderDisabled);
    }

    let flow = integration.flow.as_ref().ok_or(OAuthCallbackError::InvalidState)?;
    if flow.state_hash != compute_state_hash(state) {
        return Err(OAuthCallbackError::InvalidState);
    }

    Ok(())
}

/// Validates PKCE parameters for a public-client flow (`spec.md` §4.1 "PKCE
/// parameters validation", §8 property 5).
pub fn validate_pkce(pkce: &PkceContext, verifier: &str) -> Result<(), OAuthCallbackError> {
    if !(43..=128).contains(&verifier.len())
        || !verifier.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' || b == b'~')
    {
        return Err(OAuthCallbackError::InvalidPkceParameters);
    }

    let expected = match pkce.code_challenge_method {
        PkceMethod::S256 => {
            generate_code_challenge(verifier).map_err(|_| OAuthCallbackError::InvalidPkceParameters)?
        }
        PkceMethod::Plain => verifier.to_string(),
    };

    if expected != pkce.code_challenge {
        return Err(OAuthCallbackError::InvalidPkceParameters);
    }

    Ok(())
}

/// Builds and validates the callback redirect URI from the inbound request's
/// host, always forcing HTTPS regardless of the inbound scheme (`spec.md`
/// §4.4 step 7, §8 property 6, scenario S7).
pub fn validate_redirect_uri(
    request_host: &str,
    policy: &RedirectPolicy,
) -> Result<String, OAuthCallbackError> {
    if !policy.is_host_allowed(request_host) {
        return Err(OAuthCallbackError::InvalidRedirectUri);
    }

    let scheme = if policy.is_host_allowed(request_host)
        && policy.environment.allows_plain_http()
        && (request_host == "localhost" || request_host == "127.0.0.1")
    {
        "http"
    } else {
        "https"
    };

    if !policy.environment.allows_plain_http() && scheme != "https" {
        return Err(OAuthCallbackError::InvalidRedirectUri);
    }

    Ok(format!("{scheme}://{request_host}{path}", path = policy.callback_path))
}

/// Confirms the constructed redirect URI equals the URI registered with the
/// provider for the current environment (`spec.md` §4.1 secondary check).
pub fn verify_redirect_uri_match(
    constructed: &str,
    registered: &str,
) -> Result<(), OAuthCallbackError> {
    if constructed == registered {
        Ok(())
    } else {
        Err(OAuthCallbackError::RedirectUriMismatch)
    }
}

/// Maps any callback error to a generic redirect URL (`spec.md` §4.1 "Error
/// response generator"). Internal details never appear in the message.
#[must_use]
pub fn map_error_to_redirect(error: &OAuthCallbackError) -> String {
    format!("/oauth/error?message={}", urlencoding::encode(error.generic_message()))
}

/// Stateless orchestrator over the validation functions above. `Clone + Send
/// + Sync`; safe to construct once at startup and share across requests.
#[derive(Debug, Clone)]
pub struct CallbackSecurityService {
    redirect_policy: RedirectPolicy,
}

impl CallbackSecurityService {
    #[must_use]
    pub fn new(redirect_policy: RedirectPolicy) -> Self {
        Self { redirect_policy }
    }

    pub fn validate_state(
        &self,
        raw_state: &str,
        ctx: &RequestContext,
    ) -> Result<StateParameter, OAuthCallbackError> {
        validate_state(raw_state, ctx)
    }

    pub fn verify_ownership(
        &self,
        state: &StateParameter,
        integration: Option<&CloudProviderIntegration>,
        provider: Option<&CloudProvider>,
    ) -> Result<(), OAuthCallbackError> {
        verify_ownership(state, integration, provider)
    }

    pub fn validate_pkce(&self, pkce: &PkceContext, verifier: &str) -> Result<(), OAuthCallbackError> {
        validate_pkce(pkce, verifier)
    }

    pub fn validate_redirect_uri(&self, request_host: &str) -> Result<String, OAuthCallbackError> {
        validate_redirect_uri(request_host, &self.redirect_policy)
    }

    #[must_use]
    pub fn map_error_to_redirect(&self, error: &OAuthCallbackError) -> String {
        map_error_to_redirect(error)
    }

    /// `true` when the integration's PKCE context is present, meaning the
    /// callback must be validated as a public-client flow rather than
    /// confidential (`spec.md` §4.4 step 6).
    #[must_use]
    pub fn is_pkce_flow(integration: &CloudProviderIntegration) -> bool {
        integration.pkce.is_some()
    }

    #[must_use]
    pub fn is_active(integration: &CloudProviderIntegration) -> bool {
        integration.status == IntegrationStatus::Active
    }
}
