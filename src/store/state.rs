//! The cluster-wide current license value.

use crate::license::{License, LicenseCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single current license of the cluster plus commit metadata.
///
/// Always handled as one immutable snapshot so the generation and the license
/// are never observed out of step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLicenseState {
    /// Current license, `None` when no license is installed.
    pub license: Option<License>,

    /// Commit counter; bumped by exactly one on every successful commit.
    pub generation: u64,

    /// When the last commit happened (`None` before the first commit).
    pub last_update_time: Option<DateTime<Utc>>,
}

impl ClusterLicenseState {
    /// State of a cluster that never had a license.
    pub fn empty() -> Self {
        Self {
            license: None,
            generation: 0,
            last_update_time: None,
        }
    }

    /// Which of none / non-basic / basic the current license is.
    pub fn category(&self) -> LicenseCategory {
        LicenseCategory::of(self.license.as_ref())
    }
}

impl Default for ClusterLicenseState {
    fn default() -> Self {
        Self::empty()
    }
}
