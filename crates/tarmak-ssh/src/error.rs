// ABOUTME: Error types for SSH credential operations using thiserror.
// ABOUTME: Separates unreadable, corrupt and failed-to-generate keys so callers branch on kind.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`SshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Filesystem error unrelated to the key's content.
    Io,
    /// The key file exists but does not hold a usable RSA private key.
    Corrupt,
    /// Creating or persisting a fresh key failed.
    Generation,
    /// Converting, signing or verifying with the key failed.
    Signer,
    /// The caller asked for something unsupported.
    Config,
}

/// Why an existing key file could not be decoded.
#[derive(Error, Debug)]
pub enum KeyParseError {
    /// The file is not text.
    #[error("key file is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// The text is not a PKCS#1 `RSA PRIVATE KEY` PEM block.
    #[error("not a PEM encoded RSA private key: {0}")]
    Pem(#[from] rsa::pkcs1::Error),

    /// The PEM block decoded but the key components are inconsistent.
    #[error("RSA key failed validation: {0}")]
    Inconsistent(#[source] rsa::Error),
}

/// Errors that can occur while resolving, loading or generating an environment key.
#[derive(Error, Debug)]
pub enum SshError {
    /// Failed to read a key file from disk.
    #[error("failed to read SSH key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key file exists but holds no parseable private key. Never repaired.
    #[error("no key found in {path}: {source}")]
    KeyCorrupt {
        path: PathBuf,
        #[source]
        source: KeyParseError,
    },

    /// Failed to generate an RSA key.
    #[error("failed to generate SSH key: {0}")]
    GenerateKey(#[source] rsa::Error),

    /// Failed to PEM encode a freshly generated key.
    #[error("failed to serialize key: {0}")]
    SerializeKey(#[source] rsa::pkcs1::Error),

    /// Failed to write a key file to disk.
    #[error("failed to write key to {path}: {source}")]
    WriteKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set file permissions.
    #[error("failed to set permissions on {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Requested RSA modulus is below the supported minimum.
    #[error("RSA key size {bits} is too small (minimum {minimum} bits)")]
    KeyTooSmall { bits: usize, minimum: usize },

    /// Failed to turn an RSA key into an SSH key.
    #[error("failed to convert RSA key for SSH use: {0}")]
    ConvertKey(#[source] ssh_key::Error),

    /// Failed to sign a message.
    #[error("failed to sign message: {0}")]
    Sign(#[source] ssh_key::Error),

    /// The RSA primitive failed to produce a signature.
    #[error("failed to sign message: {0}")]
    RsaSignature(#[source] rsa::signature::Error),

    /// A signature did not verify.
    #[error("signature verification failed: {0}")]
    Verify(#[source] ssh_key::Error),
}

impl SshError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SshError::ReadKey { .. } => ErrorKind::Io,
            SshError::KeyCorrupt { .. } => ErrorKind::Corrupt,
            SshError::GenerateKey(_)
            | SshError::SerializeKey(_)
            | SshError::WriteKey { .. }
            | SshError::CreateDirectory { .. }
            | SshError::SetPermissions { .. } => ErrorKind::Generation,
            SshError::ConvertKey(_)
            | SshError::Sign(_)
            | SshError::RsaSignature(_)
            | SshError::Verify(_) => ErrorKind::Signer,
            SshError::KeyTooSmall { .. } => ErrorKind::Config,
        }
    }

    /// True when an existing key file could not be parsed.
    pub fn is_corrupt(&self) -> bool {
        self.kind() == ErrorKind::Corrupt
    }

    /// True when the key file does not exist (only returned by load-only calls).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SshError::ReadKey { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Path of the file involved, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            SshError::ReadKey { path, .. }
            | SshError::KeyCorrupt { path, .. }
            | SshError::WriteKey { path, .. }
            | SshError::CreateDirectory { path, .. }
            | SshError::SetPermissions { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias using SshError.
pub type Result<T> = std::result::Result<T, SshError>;
