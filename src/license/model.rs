//! License value object and type taxonomy.

use crate::LicenseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First artifact format version still accepted.
pub const VERSION_START: u32 = 1;

/// Artifact format version written by this crate.
pub const VERSION_CURRENT: u32 = 3;

/// Issuer recorded on licenses the product generates for itself.
pub const SELF_ISSUER: &str = "self";

/// License type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
    /// Free self-generated license.
    Basic,
    /// Time-limited self-generated license with paid features.
    Trial,
    /// Externally issued entry tier.
    Standard,
    /// Externally issued.
    Gold,
    /// Externally issued, full feature set.
    Platinum,
}

impl LicenseType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Trial => "trial",
            Self::Standard => "standard",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Whether the product can issue this type to itself.
    pub fn is_self_generated(&self) -> bool {
        matches!(self, Self::Basic | Self::Trial)
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseType {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "trial" => Ok(Self::Trial),
            "standard" => Ok(Self::Standard),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            other => Err(LicenseError::MalformedLicense(format!(
                "unknown license type: {}",
                other
            ))),
        }
    }
}

/// The three license states the basic-license flow distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseCategory {
    /// No current license.
    None,
    /// Trial or any paid type.
    NonBasic,
    /// Self-generated basic.
    Basic,
}

impl LicenseCategory {
    /// Classify the current license.
    pub fn of(license: Option<&License>) -> Self {
        match license.map(License::license_type) {
            None => Self::None,
            Some(LicenseType::Basic) => Self::Basic,
            Some(_) => Self::NonBasic,
        }
    }
}

/// Whether a license is still in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Expiry lies in the future.
    Active,
    /// Expiry has passed.
    Expired,
}

/// Field values for a license that has not been signed yet.
#[derive(Debug, Clone)]
pub struct LicenseDraft {
    /// Unique license id.
    pub uid: String,
    /// License type.
    pub license_type: LicenseType,
    /// When the license was issued.
    pub issue_date: DateTime<Utc>,
    /// When the license stops being in force.
    pub expiry_date: DateTime<Utc>,
    /// Licensee name.
    pub issued_to: String,
    /// Issuing authority ([`SELF_ISSUER`] for self-generated licenses).
    pub issuer: String,
    /// Maximum cluster size covered.
    pub max_nodes: u32,
}

impl LicenseDraft {
    /// Build an unsigned license at [`VERSION_CURRENT`].
    ///
    /// Dates are truncated to millisecond precision, the resolution of the
    /// canonical encoding.
    pub fn build(self) -> License {
        License {
            uid: self.uid,
            license_type: self.license_type,
            version: VERSION_CURRENT,
            issue_date: truncate_to_millis(self.issue_date),
            expiry_date: truncate_to_millis(self.expiry_date),
            issued_to: self.issued_to,
            issuer: self.issuer,
            max_nodes: self.max_nodes,
            signature: Vec::new(),
        }
    }
}

/// A license. Immutable once built; signing produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    uid: String,
    license_type: LicenseType,
    version: u32,
    issue_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    issued_to: String,
    issuer: String,
    max_nodes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    signature: Vec<u8>,
}

impl License {
    /// Reassemble a license from decoded fields. Used by the codec.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        uid: String,
        license_type: LicenseType,
        version: u32,
        issue_date: DateTime<Utc>,
        expiry_date: DateTime<Utc>,
        issued_to: String,
        issuer: String,
        max_nodes: u32,
    ) -> Self {
        Self {
            uid,
            license_type,
            version,
            issue_date,
            expiry_date,
            issued_to,
            issuer,
            max_nodes,
            signature: Vec::new(),
        }
    }

    /// Return a copy carrying the given signature.
    pub fn with_signature(self, signature: Vec<u8>) -> Self {
        Self { signature, ..self }
    }

    /// Unique license id.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// License type.
    pub fn license_type(&self) -> LicenseType {
        self.license_type
    }

    /// Artifact format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Issue instant.
    pub fn issue_date(&self) -> DateTime<Utc> {
        self.issue_date
    }

    /// Expiry instant.
    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    /// Licensee name.
    pub fn issued_to(&self) -> &str {
        &self.issued_to
    }

    /// Issuing authority.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Maximum cluster size covered.
    pub fn max_nodes(&self) -> u32 {
        self.max_nodes
    }

    /// Signature bytes; empty while unsigned.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Whether a signature is attached.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Whether this license was issued by the product itself.
    pub fn is_self_issued(&self) -> bool {
        self.issuer == SELF_ISSUER
    }

    /// Status at the given instant.
    pub fn status(&self, now: DateTime<Utc>) -> LicenseStatus {
        if now < self.expiry_date {
            LicenseStatus::Active
        } else {
            LicenseStatus::Expired
        }
    }
}

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}
