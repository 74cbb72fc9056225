//! State parameter — the transient, authenticity-protected envelope carried
//! through the OAuth redirect (`spec.md` §3, "State Parameter").

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// Decoded state parameter. Structurally a signed/opaque token; this crate
/// only models the decoded shape — encode/decode and signature verification
/// live in `oauthbroker_core::oauth::security` since they require the
/// process-owned signing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateParameter {
    pub tenant_id: ObjectId,
    pub integration_id: ObjectId,
    pub user_id: ObjectId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub nonce: String,
}

impl StateParameter {
    /// Nonce must be at least 16 URL-safe characters (`spec.md` §4.1).
    #[must_use]
    pub fn has_valid_nonce(&self) -> bool {
        self.nonce.len() >= 16
            && self.nonce.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }
}
