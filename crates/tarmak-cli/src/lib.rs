// ABOUTME: CLI library components for the tarmak binary.
// ABOUTME: Config directory resolution, environment name checks and operator-facing errors.

//! # tarmak-cli
//!
//! Provides the `tarmak` binary's credential commands:
//!
//! ```text
//! tarmak [-c <dir>] [-v]
//! └── ssh-key --environment <name>
//!     ├── path                      # Print the key file path
//!     ├── ensure                    # Load or generate the key
//!     ├── public                    # Print the OpenSSH public key
//!     └── fingerprint               # Print the SHA256 fingerprint
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Where does the staging key live?
//! tarmak ssh-key -e staging path
//!
//! # Use a different config directory
//! TARMAK_CONFIG=/srv/tarmak tarmak ssh-key -e staging ensure
//! ```

pub mod config;

/// Version of the tarmak CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn a credential error into the message shown to operators.
///
/// A corrupt key gets an explicit hint because the file is never replaced
/// automatically.
pub fn explain_ssh_error(err: tarmak_ssh::SshError) -> anyhow::Error {
    match &err {
        tarmak_ssh::SshError::KeyCorrupt { path, source } => anyhow::anyhow!(
            "SSH key {} is not a valid RSA private key ({}). The file was left untouched; \
             move it aside to have a new key generated.",
            path.display(),
            source
        ),
        _ => anyhow::Error::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn corrupt_key_message_names_path() {
        let manager = tarmak_ssh::CredentialManager::new("/nonexistent-root", "fake");
        let err = tarmak_ssh::parse_key(&manager.key_path(), b"IAMNOTASSHKEY").unwrap_err();

        let message = explain_ssh_error(err).to_string();
        assert!(message.contains("/nonexistent-root/fake/ssh.pem"));
        assert!(message.contains("left untouched"));
    }

    #[test]
    fn other_errors_keep_their_message() {
        let err = tarmak_ssh::SshError::KeyTooSmall {
            bits: 1024,
            minimum: 2048,
        };
        let expected = err.to_string();
        assert_eq!(explain_ssh_error(err).to_string(), expected);

        let err = tarmak_ssh::SshError::ReadKey {
            path: PathBuf::from("/p"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(explain_ssh_error(err).to_string().contains("/p"));
    }
}
