//! Persisted license state record.
//!
//! The record keeps the license as its signed envelope so that, on load, we
//! can:
//! 1. Decode the exact bytes that were signed
//! 2. Re-verify the signature (required)
//! 3. Compare the stored fingerprint

use crate::codec::SignedLicense;
use crate::crypto::digest::license_fingerprint;
use crate::crypto::LicenseVerifier;
use crate::store::state::ClusterLicenseState;
use crate::LicenseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk form of [`ClusterLicenseState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    /// Commit counter at the time of the write.
    pub generation: u64,

    /// When the persisted state was committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,

    /// Signed license envelope (absent when no license is installed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<SignedLicense>,

    /// SHA-256 fingerprint of the license's canonical encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl StateRecord {
    /// Capture a state for persistence.
    pub fn from_state(state: &ClusterLicenseState) -> Self {
        Self {
            generation: state.generation,
            last_update_time: state.last_update_time,
            license: state.license.as_ref().map(SignedLicense::from_license),
            fingerprint: state.license.as_ref().map(license_fingerprint),
        }
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, LicenseError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to serialize state: {}", e)))
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, LicenseError> {
        serde_json::from_str(json)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to deserialize state: {}", e)))
    }

    /// Rebuild the state, failing closed on anything that does not verify.
    ///
    /// # Errors
    /// * `StoreTampered` - envelope undecodable, fingerprint mismatch, or bad signature
    pub fn into_state(
        self,
        verifier: &LicenseVerifier,
    ) -> Result<ClusterLicenseState, LicenseError> {
        let license = match self.license {
            None => None,
            Some(envelope) => {
                let license = envelope
                    .into_license()
                    .map_err(|_| LicenseError::StoreTampered)?;

                if self.fingerprint.as_deref() != Some(license_fingerprint(&license).as_str()) {
                    return Err(LicenseError::StoreTampered);
                }

                verifier
                    .verify_strict(&license)
                    .map_err(|_| LicenseError::StoreTampered)?;

                Some(license)
            }
        };

        Ok(ClusterLicenseState {
            license,
            generation: self.generation,
            last_update_time: self.last_update_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::LicenseSigner;
    use crate::license::{LicenseDraft, LicenseType, SELF_ISSUER};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use chrono::{Duration, TimeZone};

    const SELF_SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    fn signer() -> LicenseSigner {
        LicenseSigner::from_hex(SELF_SEED_HEX).unwrap()
    }

    fn verifier() -> LicenseVerifier {
        let key = signer().verifying_key();
        LicenseVerifier::new(key, key)
    }

    fn state() -> ClusterLicenseState {
        let issued = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let license = signer().sign_license(
            LicenseDraft {
                uid: "persist".to_string(),
                license_type: LicenseType::Trial,
                issue_date: issued,
                expiry_date: issued + Duration::days(30),
                issued_to: "acme".to_string(),
                issuer: SELF_ISSUER.to_string(),
                max_nodes: 3,
            }
            .build(),
        );
        ClusterLicenseState {
            license: Some(license),
            generation: 7,
            last_update_time: Some(issued),
        }
    }

    #[test]
    fn record_roundtrip_restores_state() {
        let original = state();
        let json = StateRecord::from_state(&original).to_json().unwrap();
        let restored = StateRecord::from_json(&json)
            .unwrap()
            .into_state(&verifier())
            .unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn empty_state_roundtrips() {
        let json = StateRecord::from_state(&ClusterLicenseState::empty())
            .to_json()
            .unwrap();
        let restored = StateRecord::from_json(&json)
            .unwrap()
            .into_state(&verifier())
            .unwrap();
        assert_eq!(restored, ClusterLicenseState::empty());
    }

    #[test]
    fn tampered_signature_is_detected() {
        let mut record = StateRecord::from_state(&state());
        if let Some(envelope) = record.license.as_mut() {
            envelope.signature = STANDARD.encode([0u8; 64]);
        }
        assert!(matches!(
            record.into_state(&verifier()),
            Err(LicenseError::StoreTampered)
        ));
    }

    #[test]
    fn fingerprint_mismatch_is_detected() {
        let mut record = StateRecord::from_state(&state());
        record.fingerprint = Some("00".repeat(32));
        assert!(matches!(
            record.into_state(&verifier()),
            Err(LicenseError::StoreTampered)
        ));
    }

    #[test]
    fn garbage_json_is_io_error() {
        assert!(matches!(
            StateRecord::from_json("{"),
            Err(LicenseError::StoreIO(_))
        ));
    }
}
