//! The operator-facing key-file lifecycle surface.
//!
//! Generation writes a key pair as two artifacts: `<path>` holds the
//! (possibly encrypted) private representation, `<path>.pub` the
//! public-only representation, both published atomically. Import reads a
//! file back through a [`StorageBackend`] and returns a typed, validated
//! [`Key`]. Password handling is resolved up front, before any file I/O,
//! by the resolvers in [`crate::password`].

use crate::config::Settings;
use crate::crypto::{ecdsa, ed25519, encryption, rsa};
use crate::error::{Result, TrustKeysError};
use crate::keys::{
    check_expected_keytype, validate_rsa_scheme, Key, KeyMetadata, KeyType, DEFAULT_RSA_SCHEME,
};
use crate::password::{resolve_decryption_password, resolve_encryption_password, PasswordSource};
use crate::storage::{persist_temp_file, read_bytes, read_string, StorageBackend};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The path of the public half of a key file pair: `<path>.pub`.
pub fn public_key_path(filepath: &Path) -> PathBuf {
    let mut os = filepath.as_os_str().to_os_string();
    os.push(".pub");
    PathBuf::from(os)
}

fn password_context(filepath: Option<&Path>) -> String {
    match filepath {
        Some(path) => path.display().to_string(),
        None => "new key file".to_string(),
    }
}

fn resolve_filepath(filepath: Option<&Path>, key: &Key) -> Result<PathBuf> {
    match filepath {
        Some(path) if !path.as_os_str().is_empty() => Ok(path.to_path_buf()),
        _ => Ok(std::env::current_dir()?.join(&key.keyid)),
    }
}

fn private_payload(key: &Key) -> Result<&str> {
    key.keyval
        .private
        .as_deref()
        .ok_or_else(|| TrustKeysError::Crypto("generated key has no private material".to_string()))
}

/// Generate an RSA key pair and write it to `<filepath>` /
/// `<filepath>.pub` as PEM text, encrypting the private PEM when a
/// password is resolved. Returns the private key path.
///
/// When no filepath is given, the keyid is used as the filename in the
/// current working directory. When `bits` is omitted, the modulus size
/// comes from `settings`.
pub fn generate_and_write_rsa_keypair(
    filepath: Option<&Path>,
    bits: Option<usize>,
    password: Option<&str>,
    prompt: bool,
    source: &mut dyn PasswordSource,
    settings: &Settings,
) -> Result<PathBuf> {
    let context = password_context(filepath);
    let password = resolve_encryption_password(password, prompt, &context, source)?;

    let bits = bits.unwrap_or(settings.default_rsa_bits);
    let key = rsa::generate_rsa_key(bits, DEFAULT_RSA_SCHEME, settings)?;
    let filepath = resolve_filepath(filepath, &key)?;

    let private = match &password {
        Some(password) => rsa::create_rsa_encrypted_pem(private_payload(&key)?, password)?,
        None => private_payload(&key)?.to_string(),
    };

    persist_temp_file(key.keyval.public.as_bytes(), &public_key_path(&filepath))?;
    persist_temp_file(private.as_bytes(), &filepath)?;

    log::debug!("wrote RSA key pair '{}'", filepath.display());
    Ok(filepath)
}

/// Generate an Ed25519 key pair and write it to `<filepath>` /
/// `<filepath>.pub`. Returns the private key path.
pub fn generate_and_write_ed25519_keypair(
    filepath: Option<&Path>,
    password: Option<&str>,
    prompt: bool,
    source: &mut dyn PasswordSource,
    settings: &Settings,
) -> Result<PathBuf> {
    let context = password_context(filepath);
    let password = resolve_encryption_password(password, prompt, &context, source)?;

    let key = ed25519::generate_ed25519_key(settings)?;
    write_json_keypair(&key, filepath, password.as_deref())
}

/// Generate an ECDSA key pair and write it to `<filepath>` /
/// `<filepath>.pub`. Returns the private key path.
pub fn generate_and_write_ecdsa_keypair(
    filepath: Option<&Path>,
    password: Option<&str>,
    prompt: bool,
    source: &mut dyn PasswordSource,
    settings: &Settings,
) -> Result<PathBuf> {
    let context = password_context(filepath);
    let password = resolve_encryption_password(password, prompt, &context, source)?;

    let key = ecdsa::generate_ecdsa_key(settings)?;
    write_json_keypair(&key, filepath, password.as_deref())
}

/// Shared write path for the JSON-record key types (Ed25519, ECDSA).
fn write_json_keypair(
    key: &Key,
    filepath: Option<&Path>,
    password: Option<&str>,
) -> Result<PathBuf> {
    let filepath = resolve_filepath(filepath, key)?;

    let public_json = serde_json::to_string(&key.to_public_metadata())?;
    persist_temp_file(public_json.as_bytes(), &public_key_path(&filepath))?;

    let private_bytes = match password {
        Some(password) => encryption::encrypt_key(key, password)?,
        None => serde_json::to_vec(&key.to_private_metadata())?,
    };
    persist_temp_file(&private_bytes, &filepath)?;

    log::debug!(
        "wrote {} key pair '{}'",
        key.keytype,
        filepath.display()
    );
    Ok(filepath)
}

/// Import an RSA private key from the PEM file at `filepath`, decrypting
/// it when a password is resolved.
pub fn import_rsa_privatekey_from_file(
    filepath: &Path,
    password: Option<&str>,
    scheme: &str,
    prompt: bool,
    source: &mut dyn PasswordSource,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    validate_rsa_scheme(scheme)?;
    let context = filepath.display().to_string();
    let password = resolve_decryption_password(password, prompt, &context, source)?;

    let pem = read_string(backend, filepath)?;
    rsa::import_rsakey_from_private_pem(&pem, scheme, password.as_deref(), settings)
}

/// Import an RSA public key from the PEM file at `filepath`. Private
/// material found in the file is discarded.
pub fn import_rsa_publickey_from_file(
    filepath: &Path,
    scheme: &str,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    let pem = read_string(backend, filepath)?;
    rsa::import_rsakey_from_public_pem(&pem, scheme, settings)
}

/// Import an Ed25519 private key file, decrypting it when a password is
/// resolved.
pub fn import_ed25519_privatekey_from_file(
    filepath: &Path,
    password: Option<&str>,
    prompt: bool,
    source: &mut dyn PasswordSource,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    import_json_privatekey(
        filepath,
        password,
        prompt,
        KeyType::Ed25519,
        source,
        backend,
        settings,
    )
}

/// Import an Ed25519 public key file. Private material found in the file
/// is discarded.
pub fn import_ed25519_publickey_from_file(
    filepath: &Path,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    import_json_publickey(filepath, KeyType::Ed25519, backend, settings)
}

/// Import an ECDSA private key file, decrypting it when a password is
/// resolved. Files carrying the legacy ECDSA keytype spellings are
/// accepted while the compatibility window in `settings` is open.
pub fn import_ecdsa_privatekey_from_file(
    filepath: &Path,
    password: Option<&str>,
    prompt: bool,
    source: &mut dyn PasswordSource,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    import_json_privatekey(
        filepath,
        password,
        prompt,
        KeyType::Ecdsa,
        source,
        backend,
        settings,
    )
}

/// Import an ECDSA public key file. Private material found in the file is
/// discarded.
pub fn import_ecdsa_publickey_from_file(
    filepath: &Path,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    import_json_publickey(filepath, KeyType::Ecdsa, backend, settings)
}

/// Shared read path for the JSON-record private key files.
fn import_json_privatekey(
    filepath: &Path,
    password: Option<&str>,
    prompt: bool,
    expected: KeyType,
    source: &mut dyn PasswordSource,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    let context = filepath.display().to_string();
    let password = resolve_decryption_password(password, prompt, &context, source)?;

    let bytes = read_bytes(backend, filepath)?;
    let metadata = match password {
        Some(password) => encryption::decrypt_key_metadata(&bytes, &password)?,
        None => serde_json::from_slice::<KeyMetadata>(&bytes).map_err(|e| {
            TrustKeysError::Crypto(format!(
                "{}: not a valid unencrypted key file (is it encrypted?): {}",
                filepath.display(),
                e
            ))
        })?,
    };

    check_expected_keytype(&metadata.keytype, expected, settings)?;
    Key::from_metadata(metadata, settings)
}

/// Shared read path for the JSON-record public key files.
fn import_json_publickey(
    filepath: &Path,
    expected: KeyType,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<Key> {
    let json = read_string(backend, filepath)?;
    let metadata = serde_json::from_str::<KeyMetadata>(&json).map_err(|e| {
        TrustKeysError::Format(format!(
            "{}: invalid public key file: {}",
            filepath.display(),
            e
        ))
    })?;

    check_expected_keytype(&metadata.keytype, expected, settings)?;
    Ok(Key::from_metadata(metadata, settings)?.without_private())
}

/// Import multiple public keys, dispatching on the declared key type per
/// file, and aggregate them by keyid.
///
/// With `key_types` omitted every entry defaults to RSA. When two input
/// files yield the same keyid the later one wins; a warning names the
/// clobbered keyid.
pub fn import_publickeys_from_file(
    filepaths: &[PathBuf],
    key_types: Option<&[KeyType]>,
    backend: &dyn StorageBackend,
    settings: &Settings,
) -> Result<HashMap<String, Key>> {
    let default_types;
    let key_types = match key_types {
        Some(types) => types,
        None => {
            default_types = vec![KeyType::Rsa; filepaths.len()];
            &default_types
        }
    };

    if key_types.len() != filepaths.len() {
        return Err(TrustKeysError::Format(format!(
            "pass an equal number of 'filepaths' (got {}) and 'key_types' (got {}), \
             or no 'key_types' at all to default to '{}'",
            filepaths.len(),
            key_types.len(),
            KeyType::Rsa
        )));
    }

    let mut key_dict = HashMap::new();
    for (filepath, key_type) in filepaths.iter().zip(key_types) {
        let key = match key_type {
            KeyType::Rsa => {
                import_rsa_publickey_from_file(filepath, DEFAULT_RSA_SCHEME, backend, settings)?
            }
            KeyType::Ed25519 => import_ed25519_publickey_from_file(filepath, backend, settings)?,
            KeyType::Ecdsa => import_ecdsa_publickey_from_file(filepath, backend, settings)?,
        };

        if let Some(previous) = key_dict.insert(key.keyid.clone(), key) {
            log::warn!(
                "duplicate keyid '{}' while importing '{}'; keeping the later key",
                previous.keyid,
                filepath.display()
            );
        }
    }

    Ok(key_dict)
}
