// ABOUTME: SSH credential management for tarmak environments.
// ABOUTME: Resolves, loads and lazily generates the one RSA key each environment owns.

//! # tarmak-ssh
//!
//! Every tarmak environment owns exactly one SSH key pair, stored at
//! `<config root>/<environment>/ssh.pem` as a PKCS#1 PEM RSA private key.
//! It authenticates the toolkit against the instances it provisions.
//!
//! ## Features
//!
//! - **Key lifecycle**: load the environment key, or generate and persist a
//!   new one on first use. Concurrent first use yields one key, never two.
//! - **Corruption safety**: a file that is not a valid key is reported as
//!   [`SshError::KeyCorrupt`] and is never overwritten.
//! - **Signer**: wrap the key for SSH authentication and print its public key.
//!
//! ## Example
//!
//! ```no_run
//! use tarmak_ssh::{CredentialManager, EnvironmentSigner};
//!
//! let manager = CredentialManager::new("/home/user/.tarmak", "staging");
//! let key = manager.load_or_generate().expect("key should load");
//!
//! let signer = EnvironmentSigner::new(&key, "tarmak@staging").expect("signer should build");
//! println!("{}", signer.authorized_key().expect("public key should encode"));
//! println!("key file: {}", manager.key_path().display());
//! ```

mod error;
mod fingerprint;
mod key;
mod signer;

// Re-export primary types and functions
pub use error::{ErrorKind, KeyParseError, Result, SshError};
pub use fingerprint::openssh_fingerprint;
pub use key::{
    generate_key, load_key, load_or_generate_key, parse_key, resolve_key_path, CredentialManager,
    DEFAULT_KEY_BITS, KEY_DIR_MODE, KEY_FILE_MODE, KEY_FILE_NAME, MIN_KEY_BITS,
};
pub use signer::EnvironmentSigner;

// Re-export key types for convenience
pub use rsa::RsaPrivateKey;
pub use ssh_key::{PrivateKey, PublicKey, SshSig};
