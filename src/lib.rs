//! trustkeys: key-file lifecycle management for signing keys.
//!
//! This library generates, encrypts, persists, and re-imports asymmetric
//! signing key pairs (RSA, Ed25519, ECDSA) for a software-signing trust
//! system. It enables operators to:
//!
//! - Generate key pairs and write them as a `<path>` / `<path>.pub` file
//!   pair, each published by an atomic rename so no partial file is ever
//!   observable
//! - Encrypt private key files with a password (AES-256-CTR with
//!   PBKDF2-HMAC-SHA256 for Ed25519/ECDSA, encrypted PKCS#8 PEM for RSA)
//! - Re-import key files into typed, schema-validated key objects with
//!   stable content-derived keyids
//!
//! # Architecture
//!
//! The library follows a functional programming style where complex
//! operations are composed from smaller, testable functions. All
//! operations return `Result` types with comprehensive error handling.
//! Interactive password entry and file reading are injected capabilities
//! ([`password::PasswordSource`], [`storage::StorageBackend`]) so every
//! decision rule is testable without a terminal or a real filesystem
//! layout.
//!
//! # Example
//!
//! ```rust,no_run
//! use trustkeys::config::Settings;
//! use trustkeys::interface::generate_and_write_ed25519_keypair;
//! use trustkeys::password::TerminalPrompt;
//! use trustkeys::error::Result;
//! use std::path::Path;
//!
//! fn example() -> Result<()> {
//!     let settings = Settings::default();
//!     let mut prompt = TerminalPrompt;
//!     let written = generate_and_write_ed25519_keypair(
//!         Some(Path::new("keys/alice")),
//!         Some("correct horse"),
//!         false,
//!         &mut prompt,
//!         &settings,
//!     )?;
//!     println!("wrote {}", written.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod interface;
pub mod keys;
pub mod password;
pub mod storage;

// Re-export commonly used types
pub use error::{Result, TrustKeysError};
