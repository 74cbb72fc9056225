//! HTTP implementation of the OAuth Protocol Service (C2, `spec.md` §4.2).
//!
//! Grounded on the teacher's `oauthbroker_common::auth::client::OAuthClient`
//! (same `reqwest::Client` + form-encoded body + HTTP Basic shape), rewritten
//! against a single shared client serving many providers instead of one
//! client per provider configuration.
//!
//! Deliberately does not go through `crate::http::HttpClient`'s retry layer:
//! an authorization code and a refresh token are both single-use-ish
//! credentials, and retrying a failed exchange risks burning a code the
//! provider already consumed on a prior attempt.

use std::time::Duration;

use async_trait::async_trait;
use oauthbroker_core::oauth::protocol::{AuthorizationRequest, OAuthProtocolService, TokenResponse};
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::provider::CloudProvider;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Shape of a provider's JSON error body, e.g. `{"error":"invalid_grant"}`
/// (`spec.md` §4.2).
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: String,
}

/// Shape of a successful token response (`spec.md` §4.2).
#[derive(Debug, Deserialize)]
struct ProviderTokenBody {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// `reqwest`-backed [`OAuthProtocolService`], the only adapter a broker
/// deployment needs regardless of how many providers are registered.
pub struct ReqwestOAuthProtocolService {
    client: Client,
}

impl ReqwestOAuthProtocolService {
    /// Build a client with the 30 second timeout `spec.md` §4.2 mandates for
    /// the token endpoint.
    ///
    /// # Errors
    /// Returns [`OAuthCallbackError::InternalError`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new() -> Result<Self, OAuthCallbackError> {
        let client = Client::builder().timeout(EXCHANGE_TIMEOUT).no_proxy().build().map_err(|err| {
            warn!(error = %err, "failed to build OAuth protocol HTTP client");
            OAuthCallbackError::InternalError
        })?;
        Ok(Self { client })
    }

    async fn post_token_endpoint(
        &self,
        provider: &CloudProvider,
        form: &[(&str, &str)],
        use_basic_auth: bool,
    ) -> Result<TokenResponse, OAuthCallbackError> {
        let mut request = self.client.post(&provider.token_url).form(form);
        if use_basic_auth {
            request = request.basic_auth(&provider.client_id, Some(&provider.client_secret));
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_provider_error(status.as_u16(), &body));
        }

        let body: ProviderTokenBody = response.json().await.map_err(|err| {
            warn!(error = %err, "provider token response did not match expected shape");
            OAuthCallbackError::ProviderError("invalid_response".to_string())
        })?;

        let access_token = body.access_token.ok_or_else(|| {
            warn!("provider token response missing access_token");
            OAuthCallbackError::ProviderError("invalid_response".to_string())
        })?;

        Ok(TokenResponse {
            access_token,
            refresh_token: body.refresh_token,
            expires_in_secs: body.expires_in.unwrap_or(3600),
            scopes_granted: body
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl OAuthProtocolService for ReqwestOAuthProtocolService {
    fn build_authorization_url(&self, request: &AuthorizationRequest<'_>) -> String {
        let mut url = format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&state={}",
            request.provider.authorization_url,
            urlencoding::encode(&request.provider.client_id),
            urlencoding::encode(request.redirect_uri),
            urlencoding::encode(request.state),
        );

        if !request.scopes.is_empty() {
            url.push_str(&format!("&scope={}", urlencoding::encode(&request.scopes.join(" "))));
        }

        for (key, value) in &request.provider.capabilities.extra_authorize_params {
            url.push_str(&format!("&{key}={}", urlencoding::encode(value)));
        }

        if let Some((challenge, method)) = request.pkce_challenge {
            url.push_str(&format!(
                "&code_challenge={}&code_challenge_method={method}",
                urlencoding::encode(challenge)
            ));
        }

        url
    }

    async fn exchange_code(
        &self,
        provider: &CloudProvider,
        code: &str,
        redirect_uri: &str,
        pkce_verifier: Option<&str>,
    ) -> Result<TokenResponse, OAuthCallbackError> {
        debug!(provider = %provider.slug, pkce = pkce_verifier.is_some(), "exchanging authorization code");

        match pkce_verifier {
            Some(verifier) => {
                let form = [
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                    ("client_id", provider.client_id.as_str()),
                    ("code_verifier", verifier),
                ];
                self.post_token_endpoint(provider, &form, false).await
            }
            None => {
                let form = [
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                ];
                self.post_token_endpoint(provider, &form, true).await
            }
        }
    }

    async fn refresh_token(
        &self,
        provider: &CloudProvider,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthCallbackError> {
        debug!(provider = %provider.slug, "refreshing access token");

        let form = [("grant_type", "refresh_token"), ("refresh_token", refresh_token)];
        self.post_token_endpoint(provider, &form, true).await
    }
}

/// Maps a non-2xx token-endpoint response to the error kinds in `spec.md`
/// §4.2's table. Anything that doesn't parse as a provider error body is
/// treated as an invalid response shape rather than guessed at.
fn map_provider_error(status: u16, body: &str) -> OAuthCallbackError {
    match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(parsed) => OAuthCallbackError::ProviderError(parsed.error),
        Err(_) => {
            warn!(status, "provider error response did not contain a parseable error code");
            OAuthCallbackError::ProviderError(format!("http_{status}"))
        }
    }
}

/// Maps a `reqwest` transport failure (timeout, connection refused, ...) to
/// the gateway-timeout/bad-gateway split in `spec.md` §4.2.
fn map_transport_error(err: reqwest::Error) -> OAuthCallbackError {
    if err.is_timeout() {
        OAuthCallbackError::ProviderError("gateway_timeout".to_string())
    } else {
        OAuthCallbackError::ProviderError("bad_gateway".to_string())
    }
}
