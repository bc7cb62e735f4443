//! License transition decisions.
//!
//! ```text
//! NONE | NON_BASIC --start_basic (ack if NON_BASIC)--> BASIC
//! BASIC            --start_basic--------------------> rejected
//! any              --put signed license-------------> type of the artifact
//! any              --delete-------------------------> NONE
//! ```
//!
//! [`decide`] has no side effects: it reads the current state and returns
//! what should happen. Committing and signing are the coordinator's job.

use crate::crypto::digest::derive_uid;
use crate::crypto::LicenseVerifier;
use crate::license::expiry::{checked_expiry, default_expiry};
use crate::license::{License, LicenseCategory, LicenseDraft, LicenseType, SELF_ISSUER};
use crate::store::ClusterLicenseState;
use crate::transition::acknowledgement::{downgrade_messages, AcknowledgeMessages};
use crate::transition::request::TransitionRequest;
use crate::LicenseError;
use chrono::{DateTime, Duration, Utc};

/// Node count covered by self-generated licenses.
pub const SELF_GENERATED_MAX_NODES: u32 = 1000;

/// Why a transition was refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Start basic requested while basic is already current.
    AlreadyBasic,
}

impl RejectReason {
    /// Human-readable reason.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::AlreadyBasic => "Current license is basic.",
        }
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Replace the current license. Self-generated licenses come back
    /// unsigned.
    Applied {
        /// New current license, `None` to remove it.
        license: Option<License>,
    },
    /// Nothing changes until the caller repeats the request acknowledged.
    NeedsAcknowledgement {
        /// What the caller must read first.
        messages: AcknowledgeMessages,
    },
    /// Refused; repeating the request will not help.
    Rejected {
        /// Why.
        reason: RejectReason,
    },
}

/// Inputs to [`decide`] that are not part of the stored state.
pub struct DecisionContext<'a> {
    /// Current time.
    pub now: DateTime<Utc>,
    /// Lifetime of a self-generated basic license.
    pub basic_duration: Duration,
    /// Licensee recorded on self-generated licenses.
    pub cluster_name: &'a str,
    /// Checks signatures on uploaded licenses.
    pub verifier: &'a LicenseVerifier,
}

/// Whether start basic would do anything against this state.
pub fn eligible_to_start_basic(current: &ClusterLicenseState) -> bool {
    current.category() != LicenseCategory::Basic
}

/// Decide what a transition request does to the current state.
///
/// # Errors
/// * `InvalidSignature` - uploaded license does not verify
/// * `MalformedLicense` - requested basic duration is not positive or
///   overflows the expiry
pub fn decide(
    current: &ClusterLicenseState,
    request: &TransitionRequest,
    ctx: &DecisionContext<'_>,
) -> Result<Decision, LicenseError> {
    match request {
        TransitionRequest::PutLicense { license } => {
            ctx.verifier.verify_strict(license)?;
            Ok(Decision::Applied {
                license: Some(license.clone()),
            })
        }
        TransitionRequest::DeleteLicense => Ok(Decision::Applied { license: None }),
        TransitionRequest::StartBasic {
            acknowledged,
            requested_duration,
        } => decide_start_basic(current, *acknowledged, *requested_duration, ctx),
    }
}

fn decide_start_basic(
    current: &ClusterLicenseState,
    acknowledged: bool,
    requested_duration: Option<Duration>,
    ctx: &DecisionContext<'_>,
) -> Result<Decision, LicenseError> {
    let current_type = match current.license.as_ref() {
        Some(license) if license.license_type() == LicenseType::Basic => {
            return Ok(Decision::Rejected {
                reason: RejectReason::AlreadyBasic,
            });
        }
        Some(license) => Some(license.license_type()),
        None => None,
    };

    if !acknowledged {
        if let Some(messages) =
            current_type.and_then(|from| downgrade_messages(from, LicenseType::Basic))
        {
            return Ok(Decision::NeedsAcknowledgement { messages });
        }
    }

    let requested_expiry = match requested_duration {
        Some(duration) if duration <= Duration::zero() => {
            return Err(LicenseError::MalformedLicense(format!(
                "requested basic duration must be positive, got {}",
                duration
            )));
        }
        Some(duration) => Some(checked_expiry(ctx.now, duration)?),
        None => None,
    };
    let basic = self_generated_license(
        LicenseType::Basic,
        ctx.cluster_name,
        ctx.now,
        requested_expiry,
        ctx.basic_duration,
        current.generation + 1,
    )?;
    Ok(Decision::Applied {
        license: Some(basic),
    })
}

/// Build an unsigned self-generated license.
///
/// `None` for `requested_expiry` uses the type's default lifetime.
pub fn self_generated_license(
    license_type: LicenseType,
    issued_to: &str,
    now: DateTime<Utc>,
    requested_expiry: Option<DateTime<Utc>>,
    basic_duration: Duration,
    generation: u64,
) -> Result<License, LicenseError> {
    if !license_type.is_self_generated() {
        return Err(LicenseError::NotSelfGenerated {
            license_type: license_type.to_string(),
        });
    }

    let expiry_date = match requested_expiry {
        Some(expiry) => expiry,
        None => default_expiry(license_type, now, basic_duration)?,
    };
    Ok(LicenseDraft {
        uid: derive_uid(license_type, issued_to, now, generation),
        license_type,
        issue_date: now,
        expiry_date,
        issued_to: issued_to.to_string(),
        issuer: SELF_ISSUER.to_string(),
        max_nodes: SELF_GENERATED_MAX_NODES,
    }
    .build())
}
