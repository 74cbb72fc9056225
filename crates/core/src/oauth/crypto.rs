//! Secret-cipher port (`spec.md` §4.3 "envelope scheme with a process-owned
//! key"). The core depends only on this trait; the concrete AES-256-GCM
//! implementation built on the teacher's `crypto::encryption::EncryptionService`
//! lives in `oauthbroker-infra`.

use async_trait::async_trait;
use oauthbroker_domain::errors::OAuthCallbackError;

/// Encrypts/decrypts a single secret value (access token, refresh token, or
/// PKCE verifier) at rest. Implementations must never log plaintext.
#[async_trait]
pub trait SecretCipher: Send + Sync {
    async fn encrypt(&self, plaintext: &str) -> Result<String, OAuthCallbackError>;
    async fn decrypt(&self, ciphertext: &str) -> Result<String, OAuthCallbackError>;
}
