//! Pipeline orchestration for C4 (Callback Controller), C5 (Initiation
//! Controller), and C6 (Refresh Controller) — `spec.md` §4.4–§4.6.
//!
//! Each function is "a linear pipeline of result-returning steps"
//! (`SPEC_FULL.md` §4.4), the idiomatic replacement for the source's
//! thrown-exception style: every fallible step returns early via `?`, and
//! the API layer's axum handlers do nothing but call one of these and map
//! the result to an HTTP response, mirroring how the teacher's Tauri
//! commands wrap `oauthbroker_domain::Result`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use oauthbroker_common::auth::pkce::{generate_code_challenge, generate_code_verifier, generate_state};
use oauthbroker_domain::config::RedirectPolicy;
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::integration::{
    CloudProviderIntegration, FlowContext, FlowStatus, IntegrationStatus, IntegrationView, PkceContext,
    PkceMethod, TokenMaterial,
};
use oauthbroker_domain::provider::{CloudProvider, ProviderDisplay};
use oauthbroker_domain::security::CallbackAttempt;
use oauthbroker_domain::state::StateParameter;
use oauthbroker_domain::ObjectId;

use super::audit;
use super::crypto::SecretCipher;
use super::monitoring::SecurityMonitoringService;
use super::protocol::OAuthProtocolService;
use super::security::{CallbackSecurityService, RequestContext};
use super::state_codec::{compute_state_hash, encode_state};
use super::store::{IntegrationRepository, ProviderCatalog};

const STATE_TTL: ChronoDuration = ChronoDuration::minutes(10);

/// Everything the pipeline functions need, grouped so call sites (axum
/// handlers) pass one value instead of five.
pub struct OAuthServices<'a> {
    pub repository: &'a dyn IntegrationRepository,
    pub catalog: &'a dyn ProviderCatalog,
    pub protocol: &'a dyn OAuthProtocolService,
    pub cipher: &'a dyn SecretCipher,
    pub security: &'a CallbackSecurityService,
    pub monitoring: &'a SecurityMonitoringService,
}

/// Result of a successful C5 initiation (`spec.md` §4.5).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InitiateResponse {
    pub authorization_url: String,
    pub provider: ProviderDisplay,
    pub redirect_uri: String,
    pub state: String,
}

/// C5 Initiation Controller.
///
/// # Errors
/// Propagates [`OAuthCallbackError`] for a missing integration/provider, a
/// disabled provider, or an invalid redirect host.
pub async fn initiate(
    services: &OAuthServices<'_>,
    tenant_id: &ObjectId,
    integration_id: &ObjectId,
    user_id: &ObjectId,
    request_host: &str,
    now: DateTime<Utc>,
) -> Result<InitiateResponse, OAuthCallbackError> {
    audit::record_initiate_attempt(tenant_id.as_str(), integration_id.as_str());

    let integration = services
        .repository
        .find_by_id(tenant_id, integration_id)
        .await?
        .ok_or(OAuthCallbackError::IntegrationNotFound)?;

    let provider = services
        .catalog
        .find_by_id(&integration.provider_id)
        .await?
        .ok_or(OAuthCallbackError::ProviderUnavailable)?;
    if !provider.active {
        return Err(OAuthCallbackError::ProviderDisabled);
    }

    let redirect_uri = services.security.validate_redirect_uri(request_host)?;

    let nonce = generate_state().map_err(|_| OAuthCallbackError::InternalError)?;
    let state = StateParameter {
        tenant_id: tenant_id.clone(),
        integration_id: integration_id.clone(),
        user_id: user_id.clone(),
        timestamp: now.timestamp_millis(),
        nonce,
    };
    let state_hash = compute_state_hash(&state);
    let encoded_state = encode_state(&state);

    let mut pkce: Option<PkceContext> = None;
    if provider.capabilities.supports_pkce {
        let verifier = generate_code_verifier().map_err(|_| OAuthCallbackError::InternalError)?;
        let challenge =
            generate_code_challenge(&verifier).map_err(|_| OAuthCallbackError::InternalError)?;
        let verifier_encrypted = services.cipher.encrypt(&verifier).await?;
        pkce = Some(PkceContext {
            code_verifier_encrypted: verifier_encrypted,
            code_challenge: challenge,
            code_challenge_method: PkceMethod::S256,
        });
    }

    let flow = FlowContext {
        flow_id: format!("flow-{}", now.timestamp_millis()),
        nonce: state.nonce.clone(),
        state_hash,
        pkce_verifier_encrypted: pkce.as_ref().map(|p| p.code_verifier_encrypted.clone()),
        status: FlowStatus::Pending,
        created_at: now,
        expires_at: now + STATE_TTL,
    };

    let mut updated = integration;
    updated.flow = Some(flow);
    updated.pkce = pkce;
    updated.updated_at = now;
    updated.updated_by = user_id.clone();
    services.repository.save(&updated).await?;

    let authorization_url = services.protocol.build_authorization_url(
        &super::protocol::AuthorizationRequest {
            provider: &provider,
            redirect_uri: &redirect_uri,
            state: &encoded_state,
            scopes: &provider.default_scopes,
            pkce_challenge: pkce
                .as_ref()
                .map(|p| (p.code_challenge.as_str(), p.code_challenge_method)),
        },
    );

    Ok(InitiateResponse {
        authorization_url,
        provider: provider.display(),
        redirect_uri,
        state: encoded_state,
    })
}

/// Raw query parameters from the provider's callback redirect (`spec.md` §6).
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Outcome of the C4 callback pipeline — always a redirect, never a raw
/// error response (`spec.md` §4.4 failure semantics).
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    Success { tenant_id: ObjectId, integration_id: ObjectId },
    Failure { error: OAuthCallbackError },
}

impl CallbackOutcome {
    #[must_use]
    pub fn redirect_url(&self, security: &CallbackSecurityService) -> String {
        match self {
            Self::Success { tenant_id, integration_id } => {
                format!("/oauth/success?tenantId={tenant_id}&integrationId={integration_id}")
            }
            Self::Failure { error } => security.map_error_to_redirect(error),
        }
    }
}

/// C4 Callback Controller. Every exit path is audited and recorded in
/// monitoring (`spec.md` §4.4).
pub async fn process_callback(
    services: &OAuthServices<'_>,
    params: &CallbackParams,
    ctx: &RequestContext,
    request_host: &str,
) -> CallbackOutcome {
    let now = DateTime::from_timestamp_millis(ctx.now_ms).unwrap_or_else(Utc::now);
    let outcome = process_callback_inner(services, params, ctx, request_host).await;

    let (success, error_code, tenant_id, integration_id, issues) = match &outcome {
        Ok((tenant_id, integration_id)) => (true, None, Some(tenant_id.clone()), Some(integration_id.clone()), Vec::new()),
        Err(error) => {
            let issues = match error {
                OAuthCallbackError::InvalidState
                | OAuthCallbackError::StateExpired
                | OAuthCallbackError::InvalidNonce
                | OAuthCallbackError::InvalidStateStructure(_) => vec![error.code().to_string()],
                // Ownership-verification failure (`spec.md` §4.1, scenario S3): a
                // state whose tenantId/integrationId no longer resolves to a real
                // integration is as much a tampering signal as a malformed state,
                // so it is reported the same way.
                OAuthCallbackError::IntegrationNotFound => {
                    vec![error.generic_message().to_string()]
                }
                _ => Vec::new(),
            };
            (false, Some(error.code().to_string()), None, None, issues)
        }
    };

    audit::record_security_issues(&issues);
    let attempt = CallbackAttempt {
        timestamp: now,
        ip: ctx.ip.clone(),
        user_agent: ctx.user_agent.clone(),
        success,
        error_code,
        tenant_id: tenant_id.clone(),
        integration_id: integration_id.clone(),
        user_id: None,
        provider: None,
        security_issues: issues,
    };
    services.monitoring.record(attempt, now);

    match outcome {
        Ok((tenant_id, integration_id)) => {
            audit::record_callback_success(tenant_id.as_str(), integration_id.as_str(), "");
            CallbackOutcome::Success { tenant_id, integration_id }
        }
        Err(error) => {
            audit::record_callback_failure(error.code(), error.is_duplicate_attempt());
            CallbackOutcome::Failure { error }
        }
    }
}

async fn process_callback_inner(
    services: &OAuthServices<'_>,
    params: &CallbackParams,
    ctx: &RequestContext,
    request_host: &str,
) -> Result<(ObjectId, ObjectId), OAuthCallbackError> {
    if let Some(provider_error) = &params.error {
        return Err(OAuthCallbackError::ProviderError(provider_error.clone()));
    }

    let (code, raw_state) = match (&params.code, &params.state) {
        (Some(code), Some(state)) => (code, state),
        _ => return Err(OAuthCallbackError::MissingParameters),
    };

    let state = services.security.validate_state(raw_state, ctx)?;

    let integration = services
        .repository
        .find_by_id(&state.tenant_id, &state.integration_id)
        .await?;
    let provider = match &integration {
        Some(integration) => services.catalog.find_by_id(&integration.provider_id).await?,
        None => None,
    };
    services.security.verify_ownership(&state, integration.as_ref(), provider.as_ref())?;

    let integration = integration.ok_or(OAuthCallbackError::IntegrationNotFound)?;
    let provider = provider.ok_or(OAuthCallbackError::ProviderUnavailable)?;

    let mut pkce_verifier_plain: Option<String> = None;
    if let Some(pkce) = &integration.pkce {
        let verifier = services.cipher.decrypt(&pkce.code_verifier_encrypted).await?;
        services.security.validate_pkce(pkce, &verifier)?;
        pkce_verifier_plain = Some(verifier);
    }

    let redirect_uri = services.security.validate_redirect_uri(request_host)?;
    super::security::verify_redirect_uri_match(&redirect_uri, &provider.registered_redirect_uri)?;

    let token_response = services
        .protocol
        .exchange_code(&provider, code, &redirect_uri, pkce_verifier_plain.as_deref())
        .await?;

    let access_token_encrypted = services.cipher.encrypt(&token_response.access_token).await?;
    let refresh_token_encrypted = match &token_response.refresh_token {
        Some(token) => Some(services.cipher.encrypt(token).await?),
        None => integration
            .tokens
            .as_ref()
            .and_then(|t| t.refresh_token_encrypted.clone())
            .filter(|_| provider.capabilities.omits_refresh_token_on_reissue),
    };

    let now = Utc::now();
    let mut updated = integration;
    updated.status = IntegrationStatus::Active;
    updated.tokens = Some(TokenMaterial {
        access_token_encrypted,
        refresh_token_encrypted,
        expires_at: now + ChronoDuration::seconds(token_response.expires_in_secs),
        scopes_granted: token_response.scopes_granted,
    });
    updated.pkce = None;
    updated.flow = None;
    updated.updated_at = now;
    services.repository.save(&updated).await?;

    Ok((updated.tenant_id, updated.id))
}

/// Outcome of a C6 manual refresh.
#[derive(Debug, Clone)]
pub struct RefreshResponse {
    pub integration: IntegrationView,
}

/// C6 Refresh Controller. `force` refreshes even if the current access token
/// has not yet expired (`spec.md` §4.6).
pub async fn refresh(
    services: &OAuthServices<'_>,
    tenant_id: &ObjectId,
    integration_id: &ObjectId,
    force: bool,
) -> Result<RefreshResponse, OAuthCallbackError> {
    audit::record_refresh_attempt(tenant_id.as_str(), integration_id.as_str());

    let integration = services
        .repository
        .find_by_id(tenant_id, integration_id)
        .await?
        .ok_or(OAuthCallbackError::IntegrationNotFound)?;

    let tokens = integration.tokens.clone().ok_or_else(|| {
        OAuthCallbackError::ValidationError("integration has no token material".to_string())
    })?;
    let refresh_token_encrypted = tokens
        .refresh_token_encrypted
        .clone()
        .ok_or_else(|| OAuthCallbackError::ValidationError("no refresh token available".to_string()))?;

    let now = Utc::now();
    if !force && tokens.expires_at > now {
        audit::record_tokens_refresh(tenant_id.as_str(), integration_id.as_str(), false);
        return Ok(RefreshResponse { integration: integration.to_view() });
    }

    let provider = services
        .catalog
        .find_by_id(&integration.provider_id)
        .await?
        .ok_or(OAuthCallbackError::ProviderUnavailable)?;

    let refresh_token_plain = services.cipher.decrypt(&refresh_token_encrypted).await?;
    let token_response = services.protocol.refresh_token(&provider, &refresh_token_plain).await?;

    let access_token_encrypted = services.cipher.encrypt(&token_response.access_token).await?;
    let new_refresh_token_encrypted = match &token_response.refresh_token {
        Some(token) => services.cipher.encrypt(token).await?,
        None => refresh_token_encrypted,
    };

    let mut updated = integration;
    updated.status = IntegrationStatus::Active;
    updated.tokens = Some(TokenMaterial {
        access_token_encrypted,
        refresh_token_encrypted: Some(new_refresh_token_encrypted),
        expires_at: now + ChronoDuration::seconds(token_response.expires_in_secs),
        scopes_granted: token_response.scopes_granted,
    });
    updated.updated_at = now;
    services.repository.save(&updated).await?;

    audit::record_tokens_refresh(tenant_id.as_str(), integration_id.as_str(), force);
    Ok(RefreshResponse { integration: updated.to_view() })
}

/// C8-adjacent operation: clears the flow context back to `idle`
/// (`spec.md` §4.8 reset route).
pub async fn reset(
    services: &OAuthServices<'_>,
    tenant_id: &ObjectId,
    integration_id: &ObjectId,
) -> Result<(), OAuthCallbackError> {
    services
        .repository
        .find_by_id(tenant_id, integration_id)
        .await?
        .ok_or(OAuthCallbackError::IntegrationNotFound)?;
    services.repository.clear_flow(tenant_id, integration_id).await?;
    audit::record_flow_reset(tenant_id.as_str(), integration_id.as_str());
    Ok(())
}
