//! Licensing configuration.

use crate::crypto::{LicenseSigner, LicenseVerifier};
use crate::license::expiry::BASIC_LICENSE_DURATION;
use chrono::Duration;

/// Default bound on decide/compare-and-set attempts per transition.
pub const DEFAULT_MAX_UPDATE_ATTEMPTS: u32 = 5;

/// Default directory name for the persisted license state.
pub const DEFAULT_STATE_NAMESPACE: &str = "clusterlicense";

/// Default licensee recorded on self-generated licenses.
pub const DEFAULT_CLUSTER_NAME: &str = "cluster";

/// Longest accepted lifetime for a self-generated basic license.
pub const MAX_BASIC_DURATION: Duration = Duration::days(100 * 365);

/// Configuration for the license coordinator.
#[derive(Debug, Clone)]
pub struct LicensingConfig {
    /// Ed25519 seed (hex-encoded, 64 characters) used to sign self-generated
    /// licenses.
    /// SECURITY: ships with the product and must never leave the node.
    pub self_signing_key_hex: String,

    /// Ed25519 verifying key (hex-encoded, 64 characters) of the external
    /// authority that issues paid licenses.
    pub issuer_public_key_hex: String,

    /// Lifetime of a self-generated basic license.
    pub basic_duration: Duration,

    /// How many times a transition re-reads and retries after losing a
    /// compare-and-set race.
    pub max_update_attempts: u32,

    /// Directory name under the platform data dir for persisted state.
    pub state_namespace: String,

    /// Licensee recorded on self-generated licenses.
    pub cluster_name: String,
}

impl LicensingConfig {
    /// Create a configuration with default durations and retry bound.
    pub fn new(
        self_signing_key_hex: impl Into<String>,
        issuer_public_key_hex: impl Into<String>,
    ) -> Self {
        Self {
            self_signing_key_hex: self_signing_key_hex.into(),
            issuer_public_key_hex: issuer_public_key_hex.into(),
            basic_duration: BASIC_LICENSE_DURATION,
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
            state_namespace: DEFAULT_STATE_NAMESPACE.to_string(),
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::LicenseError> {
        if self.self_signing_key_hex.len() != 64 {
            return Err(crate::LicenseError::ConfigError(format!(
                "self_signing_key_hex must be 64 hex characters, got {}",
                self.self_signing_key_hex.len()
            )));
        }
        if self.issuer_public_key_hex.len() != 64 {
            return Err(crate::LicenseError::ConfigError(format!(
                "issuer_public_key_hex must be 64 hex characters, got {}",
                self.issuer_public_key_hex.len()
            )));
        }
        if self.basic_duration <= Duration::zero() {
            return Err(crate::LicenseError::ConfigError(
                "basic_duration must be positive".to_string(),
            ));
        }
        if self.basic_duration > MAX_BASIC_DURATION {
            return Err(crate::LicenseError::ConfigError(format!(
                "basic_duration must be at most {} days, got {}",
                MAX_BASIC_DURATION.num_days(),
                self.basic_duration
            )));
        }
        if self.max_update_attempts == 0 {
            return Err(crate::LicenseError::ConfigError(
                "max_update_attempts must be at least 1".to_string(),
            ));
        }
        if self.state_namespace.is_empty() {
            return Err(crate::LicenseError::ConfigError(
                "state_namespace cannot be empty".to_string(),
            ));
        }
        if self.cluster_name.is_empty() {
            return Err(crate::LicenseError::ConfigError(
                "cluster_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Signer for self-generated licenses.
    pub fn signer(&self) -> Result<LicenseSigner, crate::LicenseError> {
        LicenseSigner::from_hex(&self.self_signing_key_hex)
    }

    /// Verifier trusting the internal key and the configured issuer key.
    pub fn verifier(&self) -> Result<LicenseVerifier, crate::LicenseError> {
        let self_key = self.signer()?.verifying_key();
        let issuer_key = crate::crypto::verify::decode_public_key(&self.issuer_public_key_hex)?;
        Ok(LicenseVerifier::new(self_key, issuer_key))
    }
}
