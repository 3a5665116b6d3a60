//! Key object model.
//!
//! This module defines the typed key object shared by every key type: a
//! common header (`keytype`, `scheme`, `keyid`, `keyid_hash_algorithms`)
//! plus the public/private `keyval` payload, and the conversions between
//! the in-memory object and its on-disk JSON record.

use crate::config::Settings;
use crate::error::{Result, TrustKeysError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Default signature scheme for RSA keys.
pub const DEFAULT_RSA_SCHEME: &str = "rsassa-pss-sha256";

/// Signature schemes accepted for RSA keys.
pub const RSA_SCHEMES: &[&str] = &[
    "rsassa-pss-sha256",
    "rsassa-pss-sha384",
    "rsassa-pss-sha512",
    "rsa-pkcs1v15-sha256",
    "rsa-pkcs1v15-sha384",
    "rsa-pkcs1v15-sha512",
];

/// Signature scheme for Ed25519 keys.
pub const ED25519_SCHEME: &str = "ed25519";

/// Signature scheme for ECDSA keys (NIST P-256).
pub const ECDSA_SCHEME: &str = "ecdsa-sha2-nistp256";

/// Legacy ECDSA keytype spellings written by older tooling. Accepted on
/// read only, and only while `Settings::accept_legacy_ecdsa_types` is set.
pub const LEGACY_ECDSA_KEYTYPES: [&str; 2] = ["ecdsa-sha2-nistp256", "ecdsa-sha2-nistp384"];

/// The closed set of supported key types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa,
    Ed25519,
    Ecdsa,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Rsa => "rsa",
            KeyType::Ed25519 => "ed25519",
            KeyType::Ecdsa => "ecdsa",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for KeyType {
    type Err = TrustKeysError;

    /// Parse a caller-supplied key type. Legacy ECDSA spellings are not
    /// valid here; they are only recognized in on-disk `keytype` fields.
    fn from_str(value: &str) -> Result<KeyType> {
        match value {
            "rsa" => Ok(KeyType::Rsa),
            "ed25519" => Ok(KeyType::Ed25519),
            "ecdsa" => Ok(KeyType::Ecdsa),
            other => Err(TrustKeysError::Format(format!(
                "unsupported key type '{}', must be 'rsa', 'ed25519' or 'ecdsa'",
                other
            ))),
        }
    }
}

impl KeyType {
    /// Parse a `keytype` value read from a key file.
    ///
    /// Unlike [`KeyType::from_str`], this accepts the legacy ECDSA
    /// spellings while the compatibility window in `settings` is open.
    pub fn from_disk(value: &str, settings: &Settings) -> Result<KeyType> {
        if settings.accept_legacy_ecdsa_types && LEGACY_ECDSA_KEYTYPES.contains(&value) {
            return Ok(KeyType::Ecdsa);
        }
        KeyType::from_str(value)
            .map_err(|_| TrustKeysError::Format(format!("invalid key type loaded: '{}'", value)))
    }
}

/// The public and (optionally) private payload of a key.
///
/// For RSA and ECDSA these are PEM text; for Ed25519 they are hex-encoded
/// raw key bytes. A public-only key never carries a `private` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVal {
    pub public: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<String>,
}

/// The on-disk JSON record for Ed25519/ECDSA key files.
///
/// Public key files omit `keyid`, `keyid_hash_algorithms` and the private
/// payload; private key files carry the full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub keytype: String,
    pub scheme: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyid: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyid_hash_algorithms: Vec<String>,

    pub keyval: KeyVal,
}

/// A typed, validated key object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub keytype: KeyType,
    pub scheme: String,
    pub keyid: String,
    pub keyid_hash_algorithms: Vec<String>,
    pub keyval: KeyVal,
}

impl Key {
    /// Construct a key from its type, scheme and payload, deriving the
    /// keyid from the public content.
    pub fn new(keytype: KeyType, scheme: &str, keyval: KeyVal, settings: &Settings) -> Result<Key> {
        let keyid = compute_keyid(keytype, scheme, &keyval.public)?;
        Ok(Key {
            keytype,
            scheme: scheme.to_string(),
            keyid,
            keyid_hash_algorithms: settings.hash_algorithms.clone(),
            keyval,
        })
    }

    /// Convert an on-disk record into a validated key object.
    ///
    /// The keyid is always derived from the public content, never trusted
    /// from the file; a stored keyid that disagrees is logged and replaced.
    /// Since the public content is unchanged by encryption, keyids stay
    /// stable across decrypt/re-encrypt cycles. `keyid_hash_algorithms` is
    /// always normalized from `settings` for forward compatibility.
    pub fn from_metadata(meta: KeyMetadata, settings: &Settings) -> Result<Key> {
        let keytype = KeyType::from_disk(&meta.keytype, settings)?;
        let keyid = compute_keyid(keytype, &meta.scheme, &meta.keyval.public)?;
        if let Some(stored) = &meta.keyid {
            if stored != &keyid {
                log::warn!(
                    "stored keyid '{}' does not match the derived keyid '{}'; using the derived one",
                    stored,
                    keyid
                );
            }
        }
        Ok(Key {
            keytype,
            scheme: meta.scheme,
            keyid,
            keyid_hash_algorithms: settings.hash_algorithms.clone(),
            keyval: meta.keyval,
        })
    }

    /// The public-only on-disk record, as written to `<path>.pub`.
    pub fn to_public_metadata(&self) -> KeyMetadata {
        KeyMetadata {
            keytype: self.keytype.to_string(),
            scheme: self.scheme.clone(),
            keyid: None,
            keyid_hash_algorithms: Vec::new(),
            keyval: KeyVal {
                public: self.keyval.public.clone(),
                private: None,
            },
        }
    }

    /// The full on-disk record, as written (or encrypted) to `<path>`.
    pub fn to_private_metadata(&self) -> KeyMetadata {
        KeyMetadata {
            keytype: self.keytype.to_string(),
            scheme: self.scheme.clone(),
            keyid: Some(self.keyid.clone()),
            keyid_hash_algorithms: self.keyid_hash_algorithms.clone(),
            keyval: self.keyval.clone(),
        }
    }

    /// Drop the private payload, if any.
    pub fn without_private(mut self) -> Key {
        self.keyval.private = None;
        self
    }
}

/// Compute the content-derived key identifier.
///
/// The keyid is the SHA-256 digest of the compact, sorted-key JSON encoding
/// of the public metadata (`keytype`, `scheme`, public `keyval`), so it is
/// a pure function of the public key content and scheme.
pub fn compute_keyid(keytype: KeyType, scheme: &str, public: &str) -> Result<String> {
    let meta = serde_json::json!({
        "keytype": keytype.to_string(),
        "scheme": scheme,
        "keyval": { "public": public },
    });
    let canonical = serde_json::to_string(&meta)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Validate a caller-supplied RSA signature scheme.
pub fn validate_rsa_scheme(scheme: &str) -> Result<()> {
    if RSA_SCHEMES.contains(&scheme) {
        Ok(())
    } else {
        Err(TrustKeysError::Format(format!(
            "unsupported RSA scheme '{}', must be one of {:?}",
            scheme, RSA_SCHEMES
        )))
    }
}

/// Check that an on-disk `keytype` value matches the importer being used.
///
/// Legacy ECDSA spellings satisfy an `Ecdsa` expectation while the
/// compatibility window is open.
pub fn check_expected_keytype(
    on_disk: &str,
    expected: KeyType,
    settings: &Settings,
) -> Result<()> {
    let matches = match expected {
        KeyType::Ecdsa => {
            on_disk == "ecdsa"
                || (settings.accept_legacy_ecdsa_types
                    && LEGACY_ECDSA_KEYTYPES.contains(&on_disk))
        }
        other => on_disk == other.to_string(),
    };

    if matches {
        Ok(())
    } else {
        Err(TrustKeysError::Format(format!(
            "invalid key type loaded: '{}', expected '{}'",
            on_disk, expected
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata(keytype: &str) -> KeyMetadata {
        KeyMetadata {
            keytype: keytype.to_string(),
            scheme: ECDSA_SCHEME.to_string(),
            keyid: None,
            keyid_hash_algorithms: Vec::new(),
            keyval: KeyVal {
                public: "pubkey-pem".to_string(),
                private: Some("privkey-pem".to_string()),
            },
        }
    }

    #[test]
    fn test_keytype_from_str_valid() {
        assert_eq!("rsa".parse::<KeyType>().unwrap(), KeyType::Rsa);
        assert_eq!("ed25519".parse::<KeyType>().unwrap(), KeyType::Ed25519);
        assert_eq!("ecdsa".parse::<KeyType>().unwrap(), KeyType::Ecdsa);
    }

    #[test]
    fn test_keytype_from_str_rejects_legacy_spellings() {
        let result = "ecdsa-sha2-nistp256".parse::<KeyType>();
        match result {
            Err(TrustKeysError::Format(msg)) => assert!(msg.contains("unsupported key type")),
            _ => panic!("Expected Format error"),
        }
    }

    #[test]
    fn test_keytype_from_disk_accepts_legacy_when_enabled() {
        let settings = Settings::default();
        for legacy in LEGACY_ECDSA_KEYTYPES {
            assert_eq!(KeyType::from_disk(legacy, &settings).unwrap(), KeyType::Ecdsa);
        }
    }

    #[test]
    fn test_keytype_from_disk_rejects_legacy_when_disabled() {
        let settings = Settings {
            accept_legacy_ecdsa_types: false,
            ..Settings::default()
        };
        let result = KeyType::from_disk("ecdsa-sha2-nistp256", &settings);
        match result {
            Err(TrustKeysError::Format(msg)) => assert!(msg.contains("invalid key type loaded")),
            _ => panic!("Expected Format error"),
        }
    }

    #[test]
    fn test_keytype_from_disk_rejects_unknown() {
        let settings = Settings::default();
        let result = KeyType::from_disk("dsa", &settings);
        match result {
            Err(TrustKeysError::Format(msg)) => assert!(msg.contains("'dsa'")),
            _ => panic!("Expected Format error"),
        }
    }

    #[test]
    fn test_compute_keyid_is_stable() {
        let a = compute_keyid(KeyType::Ed25519, ED25519_SCHEME, "abcd").unwrap();
        let b = compute_keyid(KeyType::Ed25519, ED25519_SCHEME, "abcd").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_compute_keyid_depends_on_public_and_scheme() {
        let base = compute_keyid(KeyType::Rsa, "rsassa-pss-sha256", "pem").unwrap();
        let other_public = compute_keyid(KeyType::Rsa, "rsassa-pss-sha256", "pem2").unwrap();
        let other_scheme = compute_keyid(KeyType::Rsa, "rsassa-pss-sha512", "pem").unwrap();
        assert_ne!(base, other_public);
        assert_ne!(base, other_scheme);
    }

    #[test]
    fn test_from_metadata_overrides_mismatched_stored_keyid() {
        let settings = Settings::default();
        let mut meta = sample_metadata("ecdsa");
        meta.keyid = Some("deadbeef".to_string());

        let key = Key::from_metadata(meta, &settings).unwrap();
        assert_eq!(
            key.keyid,
            compute_keyid(KeyType::Ecdsa, ECDSA_SCHEME, "pubkey-pem").unwrap()
        );
        assert_eq!(key.keyid_hash_algorithms, settings.hash_algorithms);
    }

    #[test]
    fn test_from_metadata_derives_missing_keyid() {
        let settings = Settings::default();
        let key = Key::from_metadata(sample_metadata("ecdsa"), &settings).unwrap();
        assert_eq!(
            key.keyid,
            compute_keyid(KeyType::Ecdsa, ECDSA_SCHEME, "pubkey-pem").unwrap()
        );
    }

    #[test]
    fn test_public_metadata_never_carries_private() {
        let settings = Settings::default();
        let key = Key::from_metadata(sample_metadata("ecdsa"), &settings).unwrap();

        let public = key.to_public_metadata();
        assert!(public.keyval.private.is_none());
        assert!(public.keyid.is_none());
        assert!(public.keyid_hash_algorithms.is_empty());

        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("private"));
        assert!(!json.contains("keyid"));
    }

    #[test]
    fn test_private_metadata_roundtrip() {
        let settings = Settings::default();
        let key = Key::from_metadata(sample_metadata("ecdsa"), &settings).unwrap();

        let json = serde_json::to_string(&key.to_private_metadata()).unwrap();
        let parsed: KeyMetadata = serde_json::from_str(&json).unwrap();
        let restored = Key::from_metadata(parsed, &settings).unwrap();

        assert_eq!(key, restored);
    }

    #[test]
    fn test_without_private() {
        let settings = Settings::default();
        let key = Key::from_metadata(sample_metadata("ecdsa"), &settings).unwrap();
        let keyid = key.keyid.clone();

        let public_only = key.without_private();
        assert!(public_only.keyval.private.is_none());
        assert_eq!(public_only.keyid, keyid);
    }

    #[test]
    fn test_validate_rsa_scheme() {
        assert!(validate_rsa_scheme("rsassa-pss-sha256").is_ok());
        assert!(validate_rsa_scheme("rsa-pkcs1v15-sha512").is_ok());

        let result = validate_rsa_scheme("ed25519");
        match result {
            Err(TrustKeysError::Format(msg)) => assert!(msg.contains("'ed25519'")),
            _ => panic!("Expected Format error"),
        }
    }

    #[test]
    fn test_check_expected_keytype_mismatch_names_type() {
        let settings = Settings::default();
        let result = check_expected_keytype("rsa", KeyType::Ed25519, &settings);
        match result {
            Err(TrustKeysError::Format(msg)) => {
                assert!(msg.contains("'rsa'"));
                assert!(msg.contains("'ed25519'"));
            }
            _ => panic!("Expected Format error"),
        }
    }

    #[test]
    fn test_check_expected_keytype_legacy_gate() {
        let open = Settings::default();
        assert!(check_expected_keytype("ecdsa-sha2-nistp384", KeyType::Ecdsa, &open).is_ok());

        let closed = Settings {
            accept_legacy_ecdsa_types: false,
            ..Settings::default()
        };
        assert!(check_expected_keytype("ecdsa-sha2-nistp384", KeyType::Ecdsa, &closed).is_err());
        assert!(check_expected_keytype("ecdsa", KeyType::Ecdsa, &closed).is_ok());
    }
}
