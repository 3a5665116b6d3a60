//! Password resolution for key-file encryption and decryption.
//!
//! The resolvers decide, from an optional explicit password and a `prompt`
//! flag, whether a key file is encrypted/decrypted and with what password.
//! Interactive entry is injected through the [`PasswordSource`] trait so the
//! confirmation/retry logic is testable without a terminal.

use crate::error::{Result, TrustKeysError};

/// A source of passwords, interactive or scripted.
pub trait PasswordSource {
    /// Read one password, displaying `prompt` to the user where applicable.
    fn read_password(&mut self, prompt: &str) -> Result<String>;
}

/// Interactive terminal prompt without echo.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl PasswordSource for TerminalPrompt {
    fn read_password(&mut self, prompt: &str) -> Result<String> {
        rpassword::prompt_password(prompt).map_err(TrustKeysError::Storage)
    }
}

/// A pre-supplied sequence of passwords, for tests and scripted use.
#[derive(Debug, Default)]
pub struct ScriptedPasswords {
    entries: std::collections::VecDeque<String>,
}

impl ScriptedPasswords {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

impl PasswordSource for ScriptedPasswords {
    fn read_password(&mut self, _prompt: &str) -> Result<String> {
        self.entries.pop_front().ok_or_else(|| {
            TrustKeysError::Storage(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "scripted password source exhausted",
            ))
        })
    }
}

/// Obtain a password from `source`, optionally with confirmation.
///
/// With `confirm` set, the user must enter the password twice identically;
/// on mismatch they are re-prompted in a loop rather than failing.
pub fn get_password(
    source: &mut dyn PasswordSource,
    prompt: &str,
    confirm: bool,
) -> Result<String> {
    loop {
        let password = source.read_password(prompt)?;
        if !confirm {
            return Ok(password);
        }

        let confirmation = source.read_password("Confirm: ")?;
        if password == confirmation {
            return Ok(password);
        }
        eprintln!("Mismatch; try again.");
    }
}

/// Resolve the password used to encrypt a private key file.
///
/// - Fails if `password` is passed and `prompt` is true: precedence is
///   ambiguous and is never silently resolved.
/// - Fails on an explicitly passed empty password: callers must use `None`
///   to decline encryption.
/// - An empty confirmed password on the prompt means the user declines
///   encryption and resolves to `None`.
pub fn resolve_encryption_password(
    password: Option<&str>,
    prompt: bool,
    context: &str,
    source: &mut dyn PasswordSource,
) -> Result<Option<String>> {
    if password.is_some() && prompt {
        return Err(TrustKeysError::Policy(
            "passing 'password' and 'prompt=true' is not allowed".to_string(),
        ));
    }

    if prompt {
        let entered = get_password(
            source,
            &format!(
                "enter password to encrypt private key file '{}' \
                 (leave empty if key should not be encrypted): ",
                context
            ),
            true,
        )?;
        if entered.is_empty() {
            return Ok(None);
        }
        return Ok(Some(entered));
    }

    if let Some(password) = password {
        if password.is_empty() {
            return Err(TrustKeysError::Format(
                "encryption password must be 1 or more characters long".to_string(),
            ));
        }
        return Ok(Some(password.to_string()));
    }

    Ok(None)
}

/// Resolve the password used to decrypt a private key file.
///
/// Same precedence rule as [`resolve_encryption_password`]. An empty entry
/// on the prompt resolves to `None`, meaning the file is treated as
/// unencrypted. An explicitly passed password is handed through unchanged;
/// decryption will show whether it was correct.
pub fn resolve_decryption_password(
    password: Option<&str>,
    prompt: bool,
    context: &str,
    source: &mut dyn PasswordSource,
) -> Result<Option<String>> {
    if password.is_some() && prompt {
        return Err(TrustKeysError::Policy(
            "passing 'password' and 'prompt=true' is not allowed".to_string(),
        ));
    }

    if prompt {
        let entered = get_password(
            source,
            &format!(
                "enter password to decrypt private key file '{}' \
                 (leave empty if key not encrypted): ",
                context
            ),
            false,
        )?;
        if entered.is_empty() {
            return Ok(None);
        }
        return Ok(Some(entered));
    }

    Ok(password.map(ToString::to_string))
}
