//! Ed25519 license signing.
//!
//! The signature covers the canonical encoding of every field except the
//! signature itself (see [`crate::codec::canonical`]).

use crate::codec::canonical;
use crate::license::License;
use crate::LicenseError;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

/// Signs licenses with a private key held by the issuing authority.
pub struct LicenseSigner {
    signing_key: SigningKey,
}

impl LicenseSigner {
    /// Wrap an existing signing key.
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Build a signer from a hex-encoded 32-byte seed.
    pub fn from_hex(seed_hex: &str) -> Result<Self, LicenseError> {
        let bytes = hex::decode(seed_hex)
            .map_err(|e| LicenseError::ConfigError(format!("Invalid signing key hex: {}", e)))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LicenseError::ConfigError("Signing key must be 32 bytes".to_string()))?;
        Ok(Self::new(SigningKey::from_bytes(&seed)))
    }

    /// Signature bytes over the license's canonical encoding.
    pub fn sign(&self, license: &License) -> Vec<u8> {
        self.signing_key
            .sign(&canonical::encode(license))
            .to_bytes()
            .to_vec()
    }

    /// Sign a license, replacing any existing signature.
    pub fn sign_license(&self, license: License) -> License {
        let signature = self.sign(&license);
        license.with_signature(signature)
    }

    /// The matching public key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The matching public key, hex-encoded.
    pub fn verifying_key_hex(&self) -> String {
        hex::encode(self.verifying_key().to_bytes())
    }
}

impl std::fmt::Debug for LicenseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseSigner")
            .field("verifying_key", &self.verifying_key_hex())
            .finish_non_exhaustive()
    }
}
