// ABOUTME: SSH public key fingerprint computation.
// ABOUTME: Produces the SHA256: form operators compare against ssh-keygen -l output.

use ssh_key::{HashAlg, PublicKey};

/// Fingerprint in the `SHA256:<base64>` form printed by `ssh-keygen -l`.
///
/// The hash covers the key's SSH wire format, the same bytes that appear
/// base64 encoded in an `authorized_keys` line.
pub fn openssh_fingerprint(public_key: &PublicKey) -> String {
    public_key.fingerprint(HashAlg::Sha256).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::EnvironmentSigner;
    use rsa::RsaPrivateKey;
    use sha2::{Digest, Sha256};

    fn generate_test_key() -> PublicKey {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("should generate key");
        EnvironmentSigner::new(&key, "test")
            .expect("should convert key")
            .public_key()
            .clone()
    }

    #[test]
    fn test_fingerprint_consistency() {
        let pub_key = generate_test_key();

        assert_eq!(
            openssh_fingerprint(&pub_key),
            openssh_fingerprint(&pub_key),
            "fingerprint should be deterministic"
        );
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = openssh_fingerprint(&generate_test_key());

        let encoded = fp.strip_prefix("SHA256:").expect("should carry hash prefix");
        // 32 bytes, unpadded base64
        assert_eq!(encoded.len(), 43);
        assert!(!encoded.ends_with('='));
    }

    #[test]
    fn test_fingerprint_different_keys() {
        let fp1 = openssh_fingerprint(&generate_test_key());
        let fp2 = openssh_fingerprint(&generate_test_key());

        assert_ne!(fp1, fp2, "different keys should have different fingerprints");
    }

    #[test]
    fn test_fingerprint_hashes_wire_encoding() {
        let pub_key = generate_test_key();
        let wire_data = pub_key.to_bytes().expect("should encode key");
        let digest = Sha256::digest(&wire_data);

        let fingerprint = pub_key.fingerprint(HashAlg::Sha256);
        assert_eq!(fingerprint.as_bytes(), digest.as_slice());
    }
}
