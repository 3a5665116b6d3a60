//! Key material codecs.
//!
//! One module per key type (RSA, Ed25519, ECDSA) covering generation and
//! the per-type on-disk encodings, plus the password-based encryption used
//! for Ed25519/ECDSA private key files.
//!
//! RSA key material is PEM text end to end; its encrypted form is an
//! encrypted PKCS#8 PEM. Ed25519 and ECDSA keys live in a JSON record whose
//! encrypted form is produced by [`encryption`].

pub mod ecdsa;
pub mod ed25519;
pub mod encryption;
pub mod rsa;
