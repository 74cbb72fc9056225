//! Cloud Provider Integration — the core's primary aggregate (`spec.md` §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// Lifecycle status of an integration (`spec.md` §4.4 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    Idle,
    Active,
    Expired,
    Revoked,
    Error,
}

impl std::fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Status of an in-flight OAuth flow, tracked separately from the
/// integration's overall [`IntegrationStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Idle,
    Pending,
    Completed,
    Failed,
}

/// PKCE material for a public-client flow (`spec.md` §3). `code_verifier` is
/// encrypted at rest; the plaintext form only ever exists in-process for the
/// duration of a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkceContext {
    /// Base64url(AES-256-GCM(verifier)) — see `oauthbroker_core::oauth::store`.
    pub code_verifier_encrypted: String,
    pub code_challenge: String,
    pub code_challenge_method: PkceMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PkceMethod {
    S256,
    #[serde(rename = "plain")]
    Plain,
}

impl std::fmt::Display for PkceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::S256 => f.write_str("S256"),
            Self::Plain => f.write_str("plain"),
        }
    }
}

/// Short-lived flow context set at initiation, cleared at success/reset
/// (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowContext {
    pub flow_id: String,
    pub nonce: String,
    pub state_hash: String,
    pub pkce_verifier_encrypted: Option<String>,
    pub status: FlowStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FlowContext {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Tokens granted by the provider. Always treated as secrets: encrypted at
/// rest, never logged, redacted in every API-facing projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMaterial {
    pub access_token_encrypted: String,
    pub refresh_token_encrypted: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scopes_granted: Vec<String>,
}

/// The persisted association between a tenant and a cloud provider, the
/// core's primary aggregate (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudProviderIntegration {
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub provider_id: ObjectId,
    pub status: IntegrationStatus,
    pub tokens: Option<TokenMaterial>,
    pub pkce: Option<PkceContext>,
    pub flow: Option<FlowContext>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: ObjectId,
    pub updated_by: ObjectId,
}

impl CloudProviderIntegration {
    /// `status = active` ⇒ an access token is present (`spec.md` §8 property 4).
    #[must_use]
    pub fn has_live_access_token(&self) -> bool {
        self.status == IntegrationStatus::Active && self.tokens.is_some()
    }

    /// Redacted, API-safe projection (`spec.md` §4.3).
    #[must_use]
    pub fn to_view(&self) -> IntegrationView {
        IntegrationView {
            id: self.id.clone(),
            tenant_id: self.tenant_id.clone(),
            provider_id: self.provider_id.clone(),
            status: self.status,
            access_token: self.tokens.as_ref().map(|_| "[REDACTED]".to_string()),
            refresh_token: self
                .tokens
                .as_ref()
                .and_then(|t| t.refresh_token_encrypted.as_ref().map(|_| "[REDACTED]".to_string())),
            scopes_granted: self.tokens.as_ref().map(|t| t.scopes_granted.clone()).unwrap_or_default(),
            expires_at: self.tokens.as_ref().map(|t| t.expires_at),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// API-facing projection of [`CloudProviderIntegration`] with all secret
/// material redacted to the literal string `"[REDACTED]"` rather than
/// omitted, so consumers see a stable shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationView {
    pub id: ObjectId,
    pub tenant_id: ObjectId,
    pub provider_id: ObjectId,
    pub status: IntegrationStatus,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scopes_granted: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample(status: IntegrationStatus, tokens: Option<TokenMaterial>) -> CloudProviderIntegration {
        let id = ObjectId::from_str("aaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let now = Utc::now();
        CloudProviderIntegration {
            id: id.clone(),
            tenant_id: id.clone(),
            provider_id: id.clone(),
            status,
            tokens,
            pkce: None,
            flow: None,
            created_at: now,
            updated_at: now,
            created_by: id.clone(),
            updated_by: id,
        }
    }

    #[test]
    fn active_without_tokens_has_no_live_token() {
        let integration = sample(IntegrationStatus::Active, None);
        assert!(!integration.has_live_access_token());
    }

    #[test]
    fn active_with_tokens_has_live_token() {
        let tokens = TokenMaterial {
            access_token_encrypted: "enc".to_string(),
            refresh_token_encrypted: None,
            expires_at: Utc::now(),
            scopes_granted: vec!["files.read".to_string()],
        };
        let integration = sample(IntegrationStatus::Active, Some(tokens));
        assert!(integration.has_live_access_token());
    }

    #[test]
    fn view_redacts_token_fields() {
        let tokens = TokenMaterial {
            access_token_encrypted: "enc".to_string(),
            refresh_token_encrypted: Some("enc-r".to_string()),
            expires_at: Utc::now(),
            scopes_granted: vec![],
        };
        let integration = sample(IntegrationStatus::Active, Some(tokens));
        let view = integration.to_view();
        assert_eq!(view.access_token.as_deref(), Some("[REDACTED]"));
        assert_eq!(view.refresh_token.as_deref(), Some("[REDACTED]"));
    }
}
