//! Encryption key generation
//!
//! Provides secure key generation for database encryption.

use rand::Rng;

use super::SecureString;

/// Generate a cryptographically secure 64-character encryption key
///
/// Uses the `rand` crate with a cryptographically secure random number
/// generator to produce a 64-character key from the charset [A-Za-z0-9].
///
/// Returns a `SecureString` that automatically zeroes memory on drop.
///
/// # Example
/// ```
/// use oauthbroker_common::security::encryption::keys::generate_encryption_key;
///
/// let key = generate_encryption_key();
/// assert_eq!(key.len(), 64);
/// ```
///
/// # Source
/// Based on macos/db/manager.rs lines 203-214
pub fn generate_encryption_key() -> SecureString {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const KEY_LENGTH: usize = 64;

    let mut rng = rand::thread_rng();

    let key: String = (0..KEY_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    SecureString::new(key)
}
