//! ECDSA (NIST P-256) key generation.
//!
//! ECDSA keyval payloads are PEM text: a SubjectPublicKeyInfo public key
//! and a PKCS#8 private key.

use crate::config::Settings;
use crate::error::{Result, TrustKeysError};
use crate::keys::{Key, KeyType, KeyVal, ECDSA_SCHEME};
use p256::SecretKey;
use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;

/// Generate a new ECDSA key over the P-256 curve.
pub fn generate_ecdsa_key(settings: &Settings) -> Result<Key> {
    let secret = SecretKey::random(&mut OsRng);

    let public = secret
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| TrustKeysError::Crypto(format!("ECDSA public key encoding failed: {}", e)))?;
    let private = secret
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| TrustKeysError::Crypto(format!("ECDSA private key encoding failed: {}", e)))?
        .to_string();

    let keyval = KeyVal {
        public,
        private: Some(private),
    };

    Key::new(KeyType::Ecdsa, ECDSA_SCHEME, keyval, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_pem_keyvals() {
        let key = generate_ecdsa_key(&Settings::default()).unwrap();

        assert_eq!(key.keytype, KeyType::Ecdsa);
        assert_eq!(key.scheme, ECDSA_SCHEME);
        assert!(key.keyval.public.contains("BEGIN PUBLIC KEY"));
        assert!(key
            .keyval
            .private
            .as_ref()
            .unwrap()
            .contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn test_generate_produces_different_keys() {
        let settings = Settings::default();
        let a = generate_ecdsa_key(&settings).unwrap();
        let b = generate_ecdsa_key(&settings).unwrap();
        assert_ne!(a.keyid, b.keyid);
    }
}
