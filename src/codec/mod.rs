//! License artifact codec: canonical bytes for signing, JSON envelope for transport.

pub mod canonical;
pub mod envelope;

pub use canonical::{decode, encode};
pub use envelope::{from_envelope_bytes, to_envelope_bytes, SignedLicense};
