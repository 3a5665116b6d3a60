//! Ed25519 key generation.
//!
//! Ed25519 keyval payloads are hex-encoded raw key bytes: 32 bytes of
//! public key, 32 bytes of secret key.

use crate::config::Settings;
use crate::error::Result;
use crate::keys::{Key, KeyType, KeyVal, ED25519_SCHEME};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

/// Generate a new Ed25519 key using a cryptographically secure random
/// number generator.
pub fn generate_ed25519_key(settings: &Settings) -> Result<Key> {
    let signing_key = SigningKey::generate(&mut OsRng);

    let keyval = KeyVal {
        public: hex::encode(signing_key.verifying_key().to_bytes()),
        private: Some(hex::encode(signing_key.to_bytes())),
    };

    Key::new(KeyType::Ed25519, ED25519_SCHEME, keyval, settings)
}
