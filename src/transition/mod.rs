//! License state machine: requests, decisions, and results.

pub mod acknowledgement;
pub mod machine;
pub mod request;
pub mod result;

pub use acknowledgement::AcknowledgeMessages;
pub use machine::{decide, eligible_to_start_basic, Decision, DecisionContext, RejectReason};
pub use request::TransitionRequest;
pub use result::TransitionResult;
