//! Externally visible outcome of a transition.

use crate::license::License;
use crate::transition::acknowledgement::AcknowledgeMessages;
use crate::transition::machine::RejectReason;

/// Prefix of every failed transition's error message.
pub const OPERATION_FAILED_PREFIX: &str = "Operation failed: ";

/// Error message for an unacknowledged downgrade.
pub const NEEDS_ACKNOWLEDGEMENT: &str = "Needs acknowledgement.";

/// Structured result of a transition. Never carries a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// False only when the caller still has to acknowledge.
    pub acknowledged: bool,
    /// Whether the store now holds the resulting license.
    pub applied: bool,
    /// Why nothing was applied.
    pub error_message: Option<String>,
    /// Warnings to read before acknowledging, header first.
    pub warning_messages: Vec<String>,
    /// Structured form of `warning_messages`.
    pub acknowledge: Option<AcknowledgeMessages>,
    /// License current after the transition, when applied.
    pub license: Option<License>,
}

impl TransitionResult {
    /// The resulting license was committed.
    pub fn applied(license: Option<License>) -> Self {
        Self {
            acknowledged: true,
            applied: true,
            error_message: None,
            warning_messages: Vec::new(),
            acknowledge: None,
            license,
        }
    }

    /// Soft rejection: repeat with acknowledgement to proceed.
    pub fn needs_acknowledgement(messages: AcknowledgeMessages) -> Self {
        Self {
            acknowledged: false,
            applied: false,
            error_message: Some(format!("{}{}", OPERATION_FAILED_PREFIX, NEEDS_ACKNOWLEDGEMENT)),
            warning_messages: messages.flatten(),
            acknowledge: Some(messages),
            license: None,
        }
    }

    /// Hard rejection.
    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            acknowledged: true,
            applied: false,
            error_message: Some(format!("{}{}", OPERATION_FAILED_PREFIX, reason.message())),
            warning_messages: Vec::new(),
            acknowledge: None,
            license: None,
        }
    }
}
