//! trustkeys CLI application.
//!
//! This binary provides a command-line interface for generating signing
//! key pairs and importing existing key files. It prints written paths and
//! keyids, never key material.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trustkeys::config::Settings;
use trustkeys::error::Result;
use trustkeys::interface::{
    generate_and_write_ecdsa_keypair, generate_and_write_ed25519_keypair,
    generate_and_write_rsa_keypair, import_ecdsa_privatekey_from_file,
    import_ed25519_privatekey_from_file, import_publickeys_from_file,
    import_rsa_privatekey_from_file,
};
use trustkeys::keys::{KeyType, DEFAULT_RSA_SCHEME};
use trustkeys::password::TerminalPrompt;
use trustkeys::storage::FilesystemBackend;

#[derive(Parser)]
#[command(name = "trustkeys")]
#[command(about = "Generate, encrypt, persist, and re-import signing key pairs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair and write it to <path> and <path>.pub
    #[command(subcommand)]
    Keygen(KeygenCommands),

    /// Import key files and print their keyids
    #[command(subcommand)]
    Import(ImportCommands),
}

#[derive(Subcommand)]
enum KeygenCommands {
    /// Generate an RSA key pair
    Rsa {
        /// Private key path; the public key lands at <path>.pub.
        /// Defaults to the keyid in the current directory.
        #[arg(long)]
        path: Option<PathBuf>,

        /// RSA modulus size in bits (default 3072)
        #[arg(long)]
        bits: Option<usize>,

        /// Password to encrypt the private key file with
        #[arg(long)]
        password: Option<String>,

        /// Prompt interactively for an encryption password
        #[arg(long)]
        prompt: bool,
    },

    /// Generate an Ed25519 key pair
    Ed25519 {
        #[arg(long)]
        path: Option<PathBuf>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        prompt: bool,
    },

    /// Generate an ECDSA (P-256) key pair
    Ecdsa {
        #[arg(long)]
        path: Option<PathBuf>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        prompt: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import a private key file
    Private {
        /// Path of the private key file
        #[arg(long)]
        path: PathBuf,

        /// Key type: rsa, ed25519 or ecdsa
        #[arg(long = "type")]
        key_type: String,

        /// Password to decrypt the key file with
        #[arg(long)]
        password: Option<String>,

        /// Prompt interactively for a decryption password
        #[arg(long)]
        prompt: bool,

        /// Signature scheme (RSA only)
        #[arg(long, default_value = DEFAULT_RSA_SCHEME)]
        scheme: String,
    },

    /// Import public key files and print the aggregated keyids
    Public {
        /// Paths of the public key files
        #[arg(long, required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// Key types matching the paths by index (default: all rsa)
        #[arg(long = "types", num_args = 1..)]
        types: Option<Vec<String>>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::default();
    let mut source = TerminalPrompt;
    let backend = FilesystemBackend;

    match cli.command {
        Commands::Keygen(command) => {
            let written = match command {
                KeygenCommands::Rsa {
                    path,
                    bits,
                    password,
                    prompt,
                } => generate_and_write_rsa_keypair(
                    path.as_deref(),
                    bits,
                    password.as_deref(),
                    prompt,
                    &mut source,
                    &settings,
                )?,
                KeygenCommands::Ed25519 {
                    path,
                    password,
                    prompt,
                } => generate_and_write_ed25519_keypair(
                    path.as_deref(),
                    password.as_deref(),
                    prompt,
                    &mut source,
                    &settings,
                )?,
                KeygenCommands::Ecdsa {
                    path,
                    password,
                    prompt,
                } => generate_and_write_ecdsa_keypair(
                    path.as_deref(),
                    password.as_deref(),
                    prompt,
                    &mut source,
                    &settings,
                )?,
            };
            println!("{}", written.display());
        }

        Commands::Import(command) => match command {
            ImportCommands::Private {
                path,
                key_type,
                password,
                prompt,
                scheme,
            } => {
                let key_type: KeyType = key_type.parse()?;
                let key = match key_type {
                    KeyType::Rsa => import_rsa_privatekey_from_file(
                        &path,
                        password.as_deref(),
                        &scheme,
                        prompt,
                        &mut source,
                        &backend,
                        &settings,
                    )?,
                    KeyType::Ed25519 => import_ed25519_privatekey_from_file(
                        &path,
                        password.as_deref(),
                        prompt,
                        &mut source,
                        &backend,
                        &settings,
                    )?,
                    KeyType::Ecdsa => import_ecdsa_privatekey_from_file(
                        &path,
                        password.as_deref(),
                        prompt,
                        &mut source,
                        &backend,
                        &settings,
                    )?,
                };
                println!("{} {}", key.keytype, key.keyid);
            }

            ImportCommands::Public { paths, types } => {
                let parsed_types = match &types {
                    Some(types) => Some(
                        types
                            .iter()
                            .map(|t| t.parse())
                            .collect::<Result<Vec<KeyType>>>()?,
                    ),
                    None => None,
                };

                let keys =
                    import_publickeys_from_file(&paths, parsed_types.as_deref(), &backend, &settings)?;

                let mut keyids: Vec<_> = keys.keys().cloned().collect();
                keyids.sort();
                for keyid in keyids {
                    println!("{} {}", keys[&keyid].keytype, keyid);
                }
            }
        },
    }

    Ok(())
}
