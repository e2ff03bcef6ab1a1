// ABOUTME: Per-environment SSH key resolution, loading and lazy generation.
// ABOUTME: Persists RSA keys as PKCS#1 PEM with 0600 perms and never overwrites an existing file.

use crate::error::{KeyParseError, Result, SshError};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// File name of the private key inside an environment's directory.
pub const KEY_FILE_NAME: &str = "ssh.pem";

/// RSA modulus size used when none is configured.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest RSA modulus this crate will generate.
pub const MIN_KEY_BITS: usize = 2048;

/// Mode of directories created to hold a key.
pub const KEY_DIR_MODE: u32 = 0o700;

/// Mode of a written key file.
pub const KEY_FILE_MODE: u32 = 0o600;

/// Build the key path for an environment: `<config_root>/<environment>/ssh.pem`.
///
/// The environment name is used verbatim as a path segment.
pub fn resolve_key_path(config_root: &Path, environment: &str) -> PathBuf {
    config_root.join(environment).join(KEY_FILE_NAME)
}

/// Owns the SSH credential of one environment.
///
/// Holds only the inputs needed to find the key; the key itself is read from
/// disk on every call.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    config_root: PathBuf,
    environment: String,
    key_bits: usize,
}

impl CredentialManager {
    /// Create a manager for `environment` under `config_root`.
    pub fn new(config_root: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            config_root: config_root.into(),
            environment: environment.into(),
            key_bits: DEFAULT_KEY_BITS,
        }
    }

    /// Use a larger RSA modulus for keys generated by this manager.
    ///
    /// # Errors
    /// Returns `SshError::KeyTooSmall` below [`MIN_KEY_BITS`].
    pub fn with_key_bits(mut self, bits: usize) -> Result<Self> {
        check_key_bits(bits)?;
        self.key_bits = bits;
        Ok(self)
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// Path of this environment's private key file.
    pub fn key_path(&self) -> PathBuf {
        resolve_key_path(&self.config_root, &self.environment)
    }

    /// Return the environment's key, generating and persisting one on first use.
    ///
    /// # Errors
    /// `SshError::KeyCorrupt` if the file exists but holds no RSA private key;
    /// the file is left untouched. Read and write failures are returned as-is.
    pub fn load_or_generate(&self) -> Result<RsaPrivateKey> {
        load_or_generate_key(&self.key_path(), self.key_bits)
    }

    /// Load the environment's existing key without ever generating one.
    ///
    /// # Errors
    /// A missing file is `SshError::ReadKey` with a `NotFound` source.
    pub fn load(&self) -> Result<RsaPrivateKey> {
        load_key(&self.key_path())
    }
}

/// Load an existing RSA private key from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_key(key_path: &Path) -> Result<RsaPrivateKey> {
    let key_data = std::fs::read(key_path).map_err(|e| SshError::ReadKey {
        path: key_path.to_path_buf(),
        source: e,
    })?;

    parse_key(key_path, &key_data)
}

/// Decode PKCS#1 PEM key material read from `key_path`.
///
/// # Errors
/// Returns `SshError::KeyCorrupt` wrapping the decode failure.
pub fn parse_key(key_path: &Path, key_data: &[u8]) -> Result<RsaPrivateKey> {
    decode_pem(key_data).map_err(|source| SshError::KeyCorrupt {
        path: key_path.to_path_buf(),
        source,
    })
}

fn decode_pem(key_data: &[u8]) -> std::result::Result<RsaPrivateKey, KeyParseError> {
    let pem = std::str::from_utf8(key_data)?;
    // Blank lines after the END line are common in hand-edited key files
    let key = RsaPrivateKey::from_pkcs1_pem(pem.trim_end())?;
    key.validate().map_err(KeyParseError::Inconsistent)?;
    Ok(key)
}

/// Generate a new RSA key and save it to `key_path`.
///
/// Creates the parent directory (0700) if needed and writes the key with
/// 0600 permissions. The file appears atomically and is never replaced.
///
/// # Errors
/// Returns `SshError::WriteKey` with an `AlreadyExists` source if a key file
/// is already present, or any directory, generation or write failure.
pub fn generate_key(key_path: &Path, bits: usize) -> Result<RsaPrivateKey> {
    try_generate_key(key_path, bits)?.ok_or_else(|| SshError::WriteKey {
        path: key_path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "refusing to overwrite existing key",
        ),
    })
}

/// Load the key at `key_path`, or generate one if the file does not exist.
///
/// Concurrent first-use callers race on creating the file; exactly one
/// generated key is persisted and the others load it.
///
/// # Errors
/// Returns an error if key loading fails (for existing keys) or generation fails.
pub fn load_or_generate_key(key_path: &Path, bits: usize) -> Result<RsaPrivateKey> {
    trace!(path = %key_path.display(), "looking up SSH key");

    match std::fs::read(key_path) {
        Ok(key_data) => parse_key(key_path, &key_data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            match try_generate_key(key_path, bits)? {
                Some(key) => Ok(key),
                None => {
                    debug!(
                        path = %key_path.display(),
                        "SSH key created concurrently, loading it"
                    );
                    load_key(key_path)
                }
            }
        }
        Err(e) => Err(SshError::ReadKey {
            path: key_path.to_path_buf(),
            source: e,
        }),
    }
}

fn check_key_bits(bits: usize) -> Result<()> {
    if bits < MIN_KEY_BITS {
        return Err(SshError::KeyTooSmall {
            bits,
            minimum: MIN_KEY_BITS,
        });
    }
    Ok(())
}

/// Returns `Ok(None)` when another writer created the key first.
fn try_generate_key(key_path: &Path, bits: usize) -> Result<Option<RsaPrivateKey>> {
    check_key_bits(bits)?;

    let parent = match key_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_directory(parent)?;

    debug!(path = %key_path.display(), bits, "generating new SSH key");
    let private_key =
        RsaPrivateKey::new(&mut rand::thread_rng(), bits).map_err(SshError::GenerateKey)?;

    let pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(SshError::SerializeKey)?;

    // Stage next to the target so the final rename stays on one filesystem
    let write_err = |e: std::io::Error| SshError::WriteKey {
        path: key_path.to_path_buf(),
        source: e,
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".ssh.pem.")
        .tempfile_in(parent)
        .map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(KEY_FILE_MODE))
            .map_err(|e| SshError::SetPermissions {
                path: staged.path().to_path_buf(),
                source: e,
            })?;
    }

    staged.write_all(pem.as_bytes()).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;

    match staged.persist_noclobber(key_path) {
        Ok(_) => {
            debug!(path = %key_path.display(), "SSH key written");
            Ok(Some(private_key))
        }
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(write_err(std::io::Error::from(e))),
    }
}

fn ensure_directory(dir: &Path) -> Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(KEY_DIR_MODE);
    }

    builder.create(dir).map_err(|e| SshError::CreateDirectory {
        path: dir.to_path_buf(),
        source: e,
    })
}
