//! Ed25519 license signature verification.

use crate::codec::canonical;
use crate::license::License;
use crate::LicenseError;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::RwLock;

/// Cache for decoded verifying keys.
static KEY_CACHE: OnceCell<RwLock<HashMap<String, VerifyingKey>>> = OnceCell::new();

/// Decode a hex-encoded Ed25519 public key.
///
/// The key is cached after first decode for performance.
pub fn decode_public_key(hex_key: &str) -> Result<VerifyingKey, LicenseError> {
    let cache = KEY_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(guard) = cache.read() {
        if let Some(key) = guard.get(hex_key) {
            return Ok(*key);
        }
    }

    let bytes = hex::decode(hex_key)
        .map_err(|e| LicenseError::ConfigError(format!("Invalid public key hex: {}", e)))?;

    let key_array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LicenseError::ConfigError("Public key must be 32 bytes".to_string()))?;

    let verifying_key = VerifyingKey::from_bytes(&key_array)
        .map_err(|e| LicenseError::ConfigError(format!("Invalid Ed25519 public key: {}", e)))?;

    // Best-effort insert; a poisoned lock only costs a re-decode next time.
    if let Ok(mut guard) = cache.write() {
        guard.insert(hex_key.to_string(), verifying_key);
    }

    Ok(verifying_key)
}

/// Verify raw Ed25519 signature bytes over a message.
pub fn verify_ed25519(
    signature: &[u8],
    message: &[u8],
    verifying_key: &VerifyingKey,
) -> Result<(), LicenseError> {
    let sig_array: [u8; 64] = signature
        .try_into()
        .map_err(|_| LicenseError::InvalidSignature)?;

    let signature = Signature::from_bytes(&sig_array);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| LicenseError::InvalidSignature)
}

/// Verifies license signatures against the internal and the issuer key.
///
/// The key is chosen by the license's issuer: self-issued licenses must
/// verify against the internal key, everything else against the trusted
/// issuer key. A self-issued license signed with the issuer key fails.
#[derive(Debug, Clone)]
pub struct LicenseVerifier {
    self_key: VerifyingKey,
    issuer_key: VerifyingKey,
}

impl LicenseVerifier {
    /// Build a verifier from already decoded keys.
    pub fn new(self_key: VerifyingKey, issuer_key: VerifyingKey) -> Self {
        Self {
            self_key,
            issuer_key,
        }
    }

    /// Build a verifier from hex-encoded keys.
    pub fn from_hex(self_key_hex: &str, issuer_key_hex: &str) -> Result<Self, LicenseError> {
        Ok(Self::new(
            decode_public_key(self_key_hex)?,
            decode_public_key(issuer_key_hex)?,
        ))
    }

    /// Whether the license carries a valid signature. Fails closed.
    pub fn verify(&self, license: &License) -> bool {
        self.verify_strict(license).is_ok()
    }

    /// Like [`verify`](Self::verify), but as a `Result` for use with `?`.
    pub fn verify_strict(&self, license: &License) -> Result<(), LicenseError> {
        if !license.is_signed() {
            return Err(LicenseError::InvalidSignature);
        }
        let key = if license.is_self_issued() {
            &self.self_key
        } else {
            &self.issuer_key
        };
        verify_ed25519(license.signature(), &canonical::encode(license), key)
    }
}
