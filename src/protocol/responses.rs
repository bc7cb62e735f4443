//! Response bodies handed to the REST layer.
//!
//! Field names match what clients see on the wire; status codes are the
//! ones the transport should send.

use crate::license::{License, LicenseStatus, LicenseType};
use crate::transition::{AcknowledgeMessages, TransitionResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status for successful and soft-rejected requests.
pub const STATUS_OK: u16 = 200;

/// Status for requests refused because of the current license.
pub const STATUS_FORBIDDEN: u16 = 403;

/// Body of `GET /license/basic_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetBasicStatusResponse {
    /// Whether start basic would change anything.
    pub eligible_to_start_basic: bool,
}

/// Body of `POST /license/start_basic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostStartBasicResponse {
    /// False when the caller must repeat with `acknowledge=true`.
    pub acknowledged: bool,
    /// Whether a basic license is now current because of this call.
    pub basic_was_started: bool,
    /// Why the basic license was not started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Warnings to read before acknowledging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledge: Option<AcknowledgeMessages>,
}

impl PostStartBasicResponse {
    /// HTTP status the transport should send.
    ///
    /// Needs-acknowledgement is a 200 so clients get to read the warnings.
    pub fn status(&self) -> u16 {
        if self.acknowledged && !self.basic_was_started {
            STATUS_FORBIDDEN
        } else {
            STATUS_OK
        }
    }

    /// Warning messages in display order, header first.
    pub fn messages(&self) -> Vec<String> {
        self.acknowledge
            .as_ref()
            .map(AcknowledgeMessages::flatten)
            .unwrap_or_default()
    }
}

impl From<TransitionResult> for PostStartBasicResponse {
    fn from(result: TransitionResult) -> Self {
        Self {
            acknowledged: result.acknowledged,
            basic_was_started: result.applied,
            error_message: result.error_message,
            acknowledge: result.acknowledge,
        }
    }
}

/// Body of `PUT /license`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutLicenseResponse {
    /// Always true; uploads never need acknowledgement.
    pub acknowledged: bool,
    /// Status of the installed license.
    pub license_status: LicenseStatus,
    /// Informational messages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

/// Body of `DELETE /license`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteLicenseResponse {
    /// Always true.
    pub acknowledged: bool,
}

/// Public view of a license; never includes the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseView {
    /// Unique license id.
    pub uid: String,
    /// License type.
    #[serde(rename = "type")]
    pub license_type: LicenseType,
    /// Active or expired at response time.
    pub status: LicenseStatus,
    /// Issue instant.
    pub issue_date: DateTime<Utc>,
    /// Issue instant as epoch millis.
    pub issue_date_in_millis: i64,
    /// Expiry instant.
    pub expiry_date: DateTime<Utc>,
    /// Expiry instant as epoch millis.
    pub expiry_date_in_millis: i64,
    /// Licensee.
    pub issued_to: String,
    /// Issuing authority.
    pub issuer: String,
    /// Maximum cluster size.
    pub max_nodes: u32,
}

impl LicenseView {
    /// Render a license as seen at `now`.
    pub fn new(license: &License, now: DateTime<Utc>) -> Self {
        Self {
            uid: license.uid().to_string(),
            license_type: license.license_type(),
            status: license.status(now),
            issue_date: license.issue_date(),
            issue_date_in_millis: license.issue_date().timestamp_millis(),
            expiry_date: license.expiry_date(),
            expiry_date_in_millis: license.expiry_date().timestamp_millis(),
            issued_to: license.issued_to().to_string(),
            issuer: license.issuer().to_string(),
            max_nodes: license.max_nodes(),
        }
    }
}

/// Body of `GET /license`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetLicenseResponse {
    /// Current license, `null` when none is installed.
    pub license: Option<LicenseView>,
}
