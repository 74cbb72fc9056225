//! State parameter encode/decode.
//!
//! The state parameter is a plain base64url-encoded JSON body (`spec.md` §3
//! allows this "only if the callback verifies every field against the stored
//! flow context"), which [`super::security`] always does via
//! [`compute_state_hash`]. Generalizes the teacher's `auth::pkce::generate_state`
//! base64url convention to a structured payload.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use oauthbroker_domain::errors::OAuthCallbackError;
use oauthbroker_domain::state::StateParameter;
use sha2::{Digest, Sha256};

/// Encodes a [`StateParameter`] as the opaque string carried in the redirect.
#[must_use]
pub fn encode_state(state: &StateParameter) -> String {
    let json = serde_json::to_vec(state).expect("StateParameter always serializes");
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes and structurally validates a raw state string.
///
/// # Errors
/// - [`OAuthCallbackError::InvalidState`] if `raw` is empty.
/// - [`OAuthCallbackError::StateDecodeError`] if base64/JSON decoding fails.
/// - [`OAuthCallbackError::InvalidStateStructure`] if a required field is
///   malformed (non-24-hex id, for example).
pub fn decode_state(raw: &str) -> Result<StateParameter, OAuthCallbackError> {
    if raw.is_empty() {
        return Err(OAuthCallbackError::InvalidState);
    }
    let bytes =
        URL_SAFE_NO_PAD.decode(raw).map_err(|_| OAuthCallbackError::StateDecodeError)?;
    let state: StateParameter = serde_json::from_slice(&bytes)
        .map_err(|e| OAuthCallbackError::InvalidStateStructure(e.to_string()))?;
    Ok(state)
}

/// A deterministic, non-reversible fingerprint of a state parameter, stored
/// on the integration's flow context at initiation and compared against the
/// callback's decoded state to detect tampering or a stale/superseded flow.
#[must_use]
pub fn compute_state_hash(state: &StateParameter) -> String {
    let mut hasher = Sha256::new();
    hasher.update(state.tenant_id.as_str().as_bytes());
    hasher.update(state.integration_id.as_str().as_bytes());
    hasher.update(state.user_id.as_str().as_bytes());
    hasher.update(state.timestamp.to_le_bytes());
    hasher.update(state.nonce.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use oauthbroker_domain::ObjectId;

    use super::*;

    fn sample() -> StateParameter {
        let id = ObjectId::from_str("0123456789abcdef01234567").unwrap();
        StateParameter {
            tenant_id: id.clone(),
            integration_id: id.clone(),
            user_id: id,
            timestamp: 1_700_000_000_000,
            nonce: "aZ3deadbeefdeadbeef16".to_string(),
        }
    }

    #[test]
    fn round_trips() {
        let state = sample();
        let encoded = encode_state(&state);
        let decoded = decode_state(&encoded).unwrap();
        assert_eq!(decoded.nonce, state.nonce);
        assert_eq!(decoded.timestamp, state.timestamp);
    }

    #[test]
    fn empty_state_is_invalid() {
        assert!(matches!(decode_state(""), Err(OAuthCallbackError::InvalidState)));
    }

    #[test]
    fn garbage_state_is_decode_error() {
        assert!(matches!(decode_state("not-base64!!"), Err(OAuthCallbackError::StateDecodeError)));
    }

    #[test]
    fn malformed_id_is_invalid_structure_not_decode_error() {
        let raw = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "tenant_id": "not-a-valid-object-id",
                "integration_id": "0123456789abcdef01234567",
                "user_id": "0123456789abcdef01234567",
                "timestamp": 1_700_000_000_000i64,
                "nonce": "aZ3deadbeefdeadbeef16",
            })
            .to_string(),
        );
        assert!(matches!(
            decode_state(&raw),
            Err(OAuthCallbackError::InvalidStateStructure(_))
        ));
    }

    #[test]
    fn missing_field_is_invalid_structure() {
        let raw =
            URL_SAFE_NO_PAD.encode(serde_json::json!({ "tenant_id": "0123456789abcdef01234567" }).to_string());
        assert!(matches!(
            decode_state(&raw),
            Err(OAuthCallbackError::InvalidStateStructure(_))
        ));
    }

    #[test]
    fn hash_is_deterministic_and_sensitive_to_tampering() {
        let state = sample();
        let hash1 = compute_state_hash(&state);
        let hash2 = compute_state_hash(&state);
        assert_eq!(hash1, hash2);

        let mut tampered = sample();
        tampered.nonce = "differentnoncedifferent".to_string();
        assert_ne!(hash1, compute_state_hash(&tampered));
    }
}
