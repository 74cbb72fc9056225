//! OAuth Protocol Service (C2, `spec.md` §4.2).
//!
//! A port trait with one concrete HTTP implementation living in
//! `oauthbroker-infra`, the same split the teacher uses for
//! `OAuthClientTrait`/`OAuthClient` — except every method here takes the
//! [`CloudProvider`] explicitly instead of closing over one fixed
//! configuration, since a single broker instance serves many providers.

use async_trait::async_trait;
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::integration::PkceMethod;
use oauthbroker_domain::provider::CloudProvider;

/// Parameters for building an authorization URL (`spec.md` §4.2, §4.5).
#[derive(Debug, Clone)]
pub struct AuthorizationRequest<'a> {
    pub provider: &'a CloudProvider,
    pub redirect_uri: &'a str,
    pub state: &'a str,
    pub scopes: &'a [String],
    /// `Some` only for providers in `ProviderCapabilities::supports_pkce`.
    pub pkce_challenge: Option<(&'a str, PkceMethod)>,
}

/// Tokens returned by a successful exchange or refresh (`spec.md` §3,
/// "Token Material"). Never logged or displayed; the caller is responsible
/// for encrypting before persisting.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in_secs: i64,
    pub scopes_granted: Vec<String>,
}

/// Abstracts the wire protocol against a specific cloud provider's OAuth
/// endpoints. Implementations must never log `code`, `code_verifier`,
/// `refresh_token`, or any response token field.
#[async_trait]
pub trait OAuthProtocolService: Send + Sync {
    /// Builds the provider's authorization URL, applying
    /// `provider.capabilities.extra_authorize_params` (`spec.md` §9).
    fn build_authorization_url(&self, request: &AuthorizationRequest<'_>) -> String;

    /// Exchanges an authorization code for tokens (`spec.md` §4.4 step 8,
    /// scenario S5 for the `invalid_grant` failure path).
    ///
    /// # Errors
    /// Returns [`OAuthCallbackError::ProviderError`] if the provider rejects
    /// the exchange, or [`OAuthCallbackError::InternalError`] on a transport
    /// failure.
    async fn exchange_code(
        &self,
        provider: &CloudProvider,
        code: &str,
        redirect_uri: &str,
        pkce_verifier: Option<&str>,
    ) -> Result<TokenResponse, OAuthCallbackError>;

    /// Refreshes an access token (`spec.md` §4.6, C6 Refresh Controller).
    /// When `provider.capabilities.omits_refresh_token_on_reissue` is true
    /// and the response carries no new refresh token, the caller must retain
    /// the previous one — this trait never does so itself.
    ///
    /// # Errors
    /// Returns [`OAuthCallbackError::ProviderError`] if the provider rejects
    /// the refresh (e.g. a revoked grant).
    async fn refresh_token(
        &self,
        provider: &CloudProvider,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthCallbackError>;
}

#[cfg(test)]
mod tests {
    use oauthbroker_domain::provider::ProviderCapabilities;

    use super::*;

    fn provider() -> CloudProvider {
        CloudProvider {
            id: std::str::FromStr::from_str("0123456789abcdef01234567").unwrap(),
            name: "Google Drive".to_string(),
            slug: "google_drive".to_string(),
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            grant_type: "authorization_code".to_string(),
            registered_redirect_uri: "https://mwapsp.example/api/v1/oauth/callback".to_string(),
            default_scopes: vec!["https://www.googleapis.com/auth/drive.readonly".to_string()],
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            active: true,
            capabilities: ProviderCapabilities::google_drive(),
        }
    }

    struct StubProtocol;

    #[async_trait]
    impl OAuthProtocolService for StubProtocol {
        fn build_authorization_url(&self, request: &AuthorizationRequest<'_>) -> String {
            let mut url = format!(
                "{}?client_id={}&redirect_uri={}&state={}",
                request.provider.authorization_url,
                request.provider.client_id,
                request.redirect_uri,
                request.state
            );
            for (k, v) in &request.provider.capabilities.extra_authorize_params {
                url.push_str(&format!("&{k}={v}"));
            }
            if let Some((challenge, method)) = request.pkce_challenge {
                url.push_str(&format!("&code_challenge={challenge}&code_challenge_method={method}"));
            }
            url
        }

        async fn exchange_code(
            &self,
            _provider: &CloudProvider,
            code: &str,
            _redirect_uri: &str,
            _pkce_verifier: Option<&str>,
        ) -> Result<TokenResponse, OAuthCallbackError> {
            if code == "bad-code" {
                return Err(OAuthCallbackError::provider_invalid_grant());
            }
            Ok(TokenResponse {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_in_secs: 3600,
                scopes_granted: vec!["files.read".to_string()],
            })
        }

        async fn refresh_token(
            &self,
            _provider: &CloudProvider,
            _refresh_token: &str,
        ) -> Result<TokenResponse, OAuthCallbackError> {
            Ok(TokenResponse {
                access_token: "new-access".to_string(),
                refresh_token: None,
                expires_in_secs: 3600,
                scopes_granted: vec!["files.read".to_string()],
            })
        }
    }

    #[test]
    fn authorization_url_carries_provider_quirks() {
        let provider = provider();
        let request = AuthorizationRequest {
            provider: &provider,
            redirect_uri: "https://mwapsp.example/api/v1/oauth/callback",
            state: "opaque-state",
            scopes: &provider.default_scopes,
            pkce_challenge: None,
        };
        let url = StubProtocol.build_authorization_url(&request);
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[tokio::test]
    async fn exchange_maps_provider_rejection_to_invalid_grant() {
        let provider = provider();
        let err = StubProtocol
            .exchange_code(&provider, "bad-code", "https://mwapsp.example/cb", None)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthCallbackError::ProviderError(ref m) if m == "invalid_grant"));
    }
}
