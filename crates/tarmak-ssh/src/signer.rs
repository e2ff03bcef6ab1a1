// ABOUTME: Turns an environment's RSA key into an SSH authentication signer.
// ABOUTME: Exposes the OpenSSH public key line and SSHSIG sign/verify for remote execution.

use crate::error::{Result, SshError};
use crate::fingerprint::openssh_fingerprint;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha512;
use ssh_key::private::{KeypairData, RsaKeypair};
use ssh_key::{Algorithm, HashAlg, PrivateKey, PublicKey, Signature, SshSig};

/// Message hash for SSHSIG signatures.
const SIGNATURE_HASH: HashAlg = HashAlg::Sha512;

/// An environment key in SSH form, ready to authenticate remote sessions.
#[derive(Debug, Clone)]
pub struct EnvironmentSigner {
    rsa_key: RsaPrivateKey,
    private_key: PrivateKey,
}

impl EnvironmentSigner {
    /// Wrap an RSA private key. `comment` ends up on the public key line.
    ///
    /// # Errors
    /// Returns `SshError::ConvertKey` if the key cannot be represented as an SSH key.
    pub fn new(key: &RsaPrivateKey, comment: &str) -> Result<Self> {
        let keypair = RsaKeypair::try_from(key).map_err(SshError::ConvertKey)?;
        let private_key = PrivateKey::new(KeypairData::from(keypair), comment)
            .map_err(SshError::ConvertKey)?;

        Ok(Self {
            rsa_key: key.clone(),
            private_key,
        })
    }

    /// The key in `ssh-key` form, for callers building their own authenticator.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        self.private_key.public_key()
    }

    /// One-line OpenSSH public key (`ssh-rsa AAAA... comment`), as installed
    /// in `authorized_keys` on provisioned hosts.
    ///
    /// # Errors
    /// Returns `SshError::ConvertKey` if encoding fails.
    pub fn authorized_key(&self) -> Result<String> {
        self.public_key()
            .to_openssh()
            .map_err(SshError::ConvertKey)
    }

    /// `SHA256:...` fingerprint as printed by `ssh-keygen -l`.
    pub fn fingerprint(&self) -> String {
        openssh_fingerprint(self.public_key())
    }

    /// Sign `message` in the SSHSIG format under `namespace`.
    ///
    /// The blob is signed as `rsa-sha2-512` with the RSA key directly;
    /// `ssh_key::PrivateKey::sign` cannot rebuild RSA keys from their SSH form.
    ///
    /// # Errors
    /// Returns `SshError::Sign` or `SshError::RsaSignature` if signing fails.
    pub fn sign(&self, namespace: &str, message: &[u8]) -> Result<SshSig> {
        let signed_data =
            SshSig::signed_data(namespace, SIGNATURE_HASH, message).map_err(SshError::Sign)?;

        let signing_key = SigningKey::<Sha512>::new(self.rsa_key.clone());
        let raw = signing_key
            .try_sign(&signed_data)
            .map_err(SshError::RsaSignature)?;

        let signature = Signature::new(
            Algorithm::Rsa {
                hash: Some(HashAlg::Sha512),
            },
            raw.to_vec(),
        )
        .map_err(SshError::Sign)?;

        SshSig::new(
            self.public_key().key_data().clone(),
            namespace,
            SIGNATURE_HASH,
            signature,
        )
        .map_err(SshError::Sign)
    }

    /// Verify a signature produced by [`EnvironmentSigner::sign`].
    ///
    /// # Errors
    /// Returns `SshError::Verify` if the signature does not match.
    pub fn verify(&self, namespace: &str, message: &[u8], signature: &SshSig) -> Result<()> {
        self.public_key()
            .verify(namespace, message, signature)
            .map_err(SshError::Verify)
    }
}
