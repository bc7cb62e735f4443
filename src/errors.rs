//! License error types.

use thiserror::Error;

/// Errors that can occur while verifying, storing, or transitioning licenses.
///
/// Soft outcomes such as "needs acknowledgement" or "already basic" are not
/// errors; see [`crate::transition::Decision`].
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// License bytes are truncated, garbled, or carry an unsupported version.
    #[error("Malformed license: {0}")]
    MalformedLicense(String),

    /// License signature verification failed.
    #[error("License signature verification failed")]
    InvalidSignature,

    /// Compare-and-set kept losing against concurrent writers.
    #[error("Concurrent license update, gave up after {attempts} attempts")]
    ConcurrentUpdate {
        /// Number of decide/commit attempts made.
        attempts: u32,
    },

    /// License state persistence error.
    #[error("License store I/O error: {0}")]
    StoreIO(String),

    /// Only basic and trial licenses can be generated by the product itself.
    #[error("{license_type} licenses cannot be self-generated")]
    NotSelfGenerated {
        /// The requested license type.
        license_type: String,
    },

    /// Persisted license no longer verifies.
    #[error("Persisted license state has been tampered with")]
    StoreTampered,
}

impl LicenseError {
    /// Whether the caller may retry the same request unchanged.
    ///
    /// Only concurrency exhaustion is retryable; bad input stays bad.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LicenseError::ConcurrentUpdate { .. })
    }
}
