//! Transition requests.

use crate::license::License;
use chrono::Duration;

/// A requested change to the current license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionRequest {
    /// Install an uploaded, signed license.
    PutLicense {
        /// The license as decoded from the uploaded envelope.
        license: License,
    },
    /// Remove the current license.
    DeleteLicense,
    /// Replace the current license with a self-generated basic license.
    StartBasic {
        /// Caller has read and accepted the downgrade warnings.
        acknowledged: bool,
        /// Overrides the configured basic lifetime.
        requested_duration: Option<Duration>,
    },
}

impl TransitionRequest {
    /// Start basic with the configured lifetime.
    pub fn start_basic(acknowledged: bool) -> Self {
        Self::StartBasic {
            acknowledged,
            requested_duration: None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PutLicense { .. } => "put_license",
            Self::DeleteLicense => "delete_license",
            Self::StartBasic { .. } => "start_basic",
        }
    }
}
