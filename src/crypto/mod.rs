//! Cryptographic primitives for license signing and verification.

pub mod digest;
pub mod signing;
pub mod verify;

pub use signing::LicenseSigner;
pub use verify::LicenseVerifier;
