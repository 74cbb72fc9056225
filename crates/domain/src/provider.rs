//! Cloud provider catalog types (`spec.md` §3, "Cloud Provider").
//!
//! The provider catalog is external and read-only to this core; these types
//! describe the shape the core expects the catalog to hand back, not a
//! storage schema.

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// A registered OAuth provider (Dropbox, Google Drive, OneDrive, ...).
///
/// `client_secret` is never included in any `Serialize` output consumed by a
/// response body — the field simply isn't on this struct. Call sites that
/// need it read it from [`CloudProvider::client_secret`] directly and must
/// not forward the whole struct to an API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudProvider {
    pub id: ObjectId,
    pub name: String,
    pub slug: String,
    pub authorization_url: String,
    pub token_url: String,
    pub grant_type: String,
    /// The callback URI registered with the provider for this environment
    /// (`spec.md` §4.1, "secondary check"). Compared against the URI the
    /// callback controller constructs from the inbound request host.
    pub registered_redirect_uri: String,
    pub default_scopes: Vec<String>,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub active: bool,
    pub capabilities: ProviderCapabilities,
}

impl CloudProvider {
    #[must_use]
    pub fn display(&self) -> ProviderDisplay {
        ProviderDisplay { name: self.slug.clone(), display_name: self.name.clone() }
    }
}

/// `{ name, displayName }` projection returned by the initiation endpoint
/// (`spec.md` §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDisplay {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Per-provider OAuth quirks, consumed only by the protocol service — never
/// branched on by name in a controller (`spec.md` §9, "dynamic-dispatch
/// quirks"). Generalizes the teacher's `CalendarOAuthSettings::google()`
/// (`access_type=offline`, `prompt=consent`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Extra `key=value` pairs appended to the authorization URL.
    pub extra_authorize_params: Vec<(String, String)>,
    /// Extra `key=value` pairs appended to the token exchange/refresh body.
    pub extra_token_params: Vec<(String, String)>,
    /// True if this provider omits `refresh_token` on a refresh response,
    /// meaning the caller must keep reusing the previous one.
    pub omits_refresh_token_on_reissue: bool,
    /// True when this provider supports the PKCE public-client flow.
    pub supports_pkce: bool,
}

impl ProviderCapabilities {
    /// Google Drive settings: requests offline access and forces the consent
    /// screen so a refresh token is always issued on first connection.
    #[must_use]
    pub fn google_drive() -> Self {
        Self {
            extra_authorize_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
            extra_token_params: Vec::new(),
            omits_refresh_token_on_reissue: true,
            supports_pkce: true,
        }
    }

    /// OneDrive/Microsoft Graph settings.
    #[must_use]
    pub fn onedrive() -> Self {
        Self {
            extra_authorize_params: vec![(
                "response_mode".to_string(),
                "query".to_string(),
            )],
            extra_token_params: Vec::new(),
            omits_refresh_token_on_reissue: false,
            supports_pkce: true,
        }
    }

    /// Dropbox settings: `token_access_type=offline` is the Dropbox-specific
    /// equivalent of Google's `access_type=offline`.
    #[must_use]
    pub fn dropbox() -> Self {
        Self {
            extra_authorize_params: vec![(
                "token_access_type".to_string(),
                "offline".to_string(),
            )],
            extra_token_params: Vec::new(),
            omits_refresh_token_on_reissue: false,
            supports_pkce: false,
        }
    }
}
