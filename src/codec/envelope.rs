//! Signed license envelope used on the wire and on disk.
//!
//! The envelope carries the canonical payload bytes next to the signature,
//! both base64-encoded, so the verifier checks exactly the bytes the issuer
//! signed.

use crate::codec::canonical;
use crate::license::License;
use crate::LicenseError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// JSON envelope around a signed license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLicense {
    /// Base64 canonical encoding of the license fields.
    pub payload: String,

    /// Base64 signature over the decoded payload bytes.
    pub signature: String,
}

impl SignedLicense {
    /// Wrap a license (signed or not) into an envelope.
    pub fn from_license(license: &License) -> Self {
        Self {
            payload: STANDARD.encode(canonical::encode(license)),
            signature: STANDARD.encode(license.signature()),
        }
    }

    /// Decode the envelope back into a license with its signature attached.
    ///
    /// No signature check happens here.
    pub fn into_license(self) -> Result<License, LicenseError> {
        let payload = STANDARD
            .decode(&self.payload)
            .map_err(|e| LicenseError::MalformedLicense(format!("invalid payload base64: {}", e)))?;
        let signature = STANDARD.decode(&self.signature).map_err(|e| {
            LicenseError::MalformedLicense(format!("invalid signature base64: {}", e))
        })?;
        Ok(canonical::decode(&payload)?.with_signature(signature))
    }

    /// Serialize the envelope to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LicenseError> {
        serde_json::to_vec(self).map_err(|e| {
            LicenseError::MalformedLicense(format!("failed to serialize envelope: {}", e))
        })
    }

    /// Parse an envelope from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LicenseError> {
        serde_json::from_slice(bytes)
            .map_err(|e| LicenseError::MalformedLicense(format!("invalid license envelope: {}", e)))
    }
}

/// Serialize a license into envelope bytes.
pub fn to_envelope_bytes(license: &License) -> Result<Vec<u8>, LicenseError> {
    SignedLicense::from_license(license).to_bytes()
}

/// Parse envelope bytes into a license with its signature attached.
pub fn from_envelope_bytes(bytes: &[u8]) -> Result<License, LicenseError> {
    SignedLicense::from_bytes(bytes)?.into_license()
}
