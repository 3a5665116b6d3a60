//! Password-based encryption for Ed25519/ECDSA private key files.
//!
//! The private key JSON record is encrypted with AES-256 in CTR mode under
//! a key derived from the password with PBKDF2-HMAC-SHA256, and
//! authenticated with HMAC-SHA256. Wrong password and corrupted ciphertext
//! are indistinguishable to the caller: both surface as a single crypto
//! error kind.
//!
//! Blob layout:
//! `salt (16) || iterations (u32 BE) || iv (16) || mac (32) || ciphertext`

use crate::error::{Result, TrustKeysError};
use crate::keys::{Key, KeyMetadata};
use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes256;
use ctr::Ctr128BE;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

type Aes256Ctr = Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Length of the random PBKDF2 salt.
pub const SALT_LENGTH: usize = 16;

/// Length of the AES-CTR initialization vector.
pub const IV_LENGTH: usize = 16;

/// Length of the HMAC-SHA256 tag.
pub const MAC_LENGTH: usize = 32;

/// Length of the derived AES-256 key.
pub const KEY_LENGTH: usize = 32;

/// PBKDF2 iteration count used when encrypting. Stored in the blob so
/// files written with other counts still decrypt.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

const ITERATIONS_FIELD_LENGTH: usize = 4;
const HEADER_LENGTH: usize = SALT_LENGTH + ITERATIONS_FIELD_LENGTH + IV_LENGTH + MAC_LENGTH;

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LENGTH] {
    let mut derived = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut derived);
    derived
}

/// Encrypt a key's full private record under `password`.
pub fn encrypt_key(key: &Key, password: &str) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(TrustKeysError::Format(
            "encryption password must be 1 or more characters long".to_string(),
        ));
    }

    let plaintext = serde_json::to_vec(&key.to_private_metadata())?;

    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let derived = derive_key(password, &salt, PBKDF2_ITERATIONS);

    let mut ciphertext = plaintext;
    let mut cipher = Aes256Ctr::new(&derived.into(), &iv.into());
    cipher.apply_keystream(&mut ciphertext);

    let mut mac = HmacSha256::new_from_slice(&derived)
        .map_err(|e| TrustKeysError::Crypto(format!("HMAC initialization failed: {}", e)))?;
    mac.update(&iv);
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    let mut output = Vec::with_capacity(HEADER_LENGTH + ciphertext.len());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&PBKDF2_ITERATIONS.to_be_bytes());
    output.extend_from_slice(&iv);
    output.extend_from_slice(&tag);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Decrypt an encrypted key file back into its on-disk record.
///
/// The caller validates the record's `keytype` against the importer in use.
pub fn decrypt_key_metadata(encrypted: &[u8], password: &str) -> Result<KeyMetadata> {
    if encrypted.len() < HEADER_LENGTH {
        return Err(TrustKeysError::Crypto(format!(
            "encrypted key file too short: expected at least {} bytes, got {}",
            HEADER_LENGTH,
            encrypted.len()
        )));
    }

    let (salt, rest) = encrypted.split_at(SALT_LENGTH);
    let (iterations_bytes, rest) = rest.split_at(ITERATIONS_FIELD_LENGTH);
    let (iv, rest) = rest.split_at(IV_LENGTH);
    let (tag, ciphertext) = rest.split_at(MAC_LENGTH);

    let mut iterations_array = [0u8; ITERATIONS_FIELD_LENGTH];
    iterations_array.copy_from_slice(iterations_bytes);
    let iterations = u32::from_be_bytes(iterations_array);
    if iterations == 0 {
        return Err(TrustKeysError::Crypto(
            "encrypted key file carries a zero PBKDF2 iteration count".to_string(),
        ));
    }

    let derived = derive_key(password, salt, iterations);

    let mut mac = HmacSha256::new_from_slice(&derived)
        .map_err(|e| TrustKeysError::Crypto(format!("HMAC initialization failed: {}", e)))?;
    mac.update(iv);
    mac.update(ciphertext);
    mac.verify_slice(tag).map_err(|_| {
        TrustKeysError::Crypto("decryption failed: wrong password or corrupted file".to_string())
    })?;

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new_from_slices(&derived, iv)
        .map_err(|e| TrustKeysError::Crypto(format!("cipher initialization failed: {}", e)))?;
    cipher.apply_keystream(&mut plaintext);

    serde_json::from_slice(&plaintext).map_err(|e| {
        TrustKeysError::Crypto(format!("decrypted key file is not a valid key record: {}", e))
    })
}
