//! Process-wide configuration.
//!
//! Settings are constructed once at startup and passed by reference to the
//! components that need them. Nothing in this crate reads ambient global
//! state.

/// Recommended RSA key sizes:
/// <https://en.wikipedia.org/wiki/Key_size#Asymmetric_algorithm_key_lengths>
/// RSA keys of 3072 bits are expected to provide security through 2031 and
/// beyond.
pub const DEFAULT_RSA_KEY_BITS: usize = 3072;

/// Minimum accepted RSA modulus size in bits.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Immutable process-wide settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Hash algorithms used to compute alternate keyids so that equal keys
    /// with different keyids can be associated.
    pub hash_algorithms: Vec<String>,

    /// Default modulus size for generated RSA keys.
    pub default_rsa_bits: usize,

    /// Whether key files carrying the legacy ECDSA keytype spellings
    /// (`ecdsa-sha2-nistp256`, `ecdsa-sha2-nistp384`) are still accepted on
    /// import. This is a compatibility window for files written by older
    /// tooling; set to `false` to close it.
    pub accept_legacy_ecdsa_types: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hash_algorithms: vec!["sha256".to_string(), "sha512".to_string()],
            default_rsa_bits: DEFAULT_RSA_KEY_BITS,
            accept_legacy_ecdsa_types: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.hash_algorithms, vec!["sha256", "sha512"]);
        assert_eq!(settings.default_rsa_bits, 3072);
        assert!(settings.accept_legacy_ecdsa_types);
    }
}
