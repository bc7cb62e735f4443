//! # clusterlicense
//!
//! **Signed, cluster-wide license management for Rust services.**
//!
//! A cluster holds exactly one current license. Every change to it goes
//! through a pure state machine and is committed with a generation-checked
//! compare-and-set, so concurrent requests on any node resolve to exactly one
//! winner.
//!
//! ## Features
//!
//! - **Ed25519 signed licenses** - paid licenses verify against the issuer key,
//!   self-generated basic and trial licenses against the internal key
//! - **Canonical encoding** - signatures cover a deterministic byte layout
//! - **Acknowledged downgrades** - leaving a paid or trial license for basic
//!   requires the caller to read and acknowledge what stops working
//! - **Bounded optimistic concurrency** - losers of a commit race re-read and
//!   decide again, up to a configured number of attempts
//! - **Authenticated persistence** - persisted state is re-verified on load
//!
//! ## Quickstart
//!
//! ```no_run
//! use clusterlicense::{LicenseCoordinator, LicensingConfig};
//!
//! fn main() -> Result<(), clusterlicense::LicenseError> {
//!     let config = LicensingConfig::new(
//!         "your-internal-ed25519-seed-hex",
//!         "your-issuer-ed25519-public-key-hex",
//!     );
//!
//!     let coordinator = LicenseCoordinator::open(config)?;
//!     if coordinator.get_basic_status().eligible_to_start_basic {
//!         let response = coordinator.start_basic(true)?;
//!         println!("basic started: {}", response.basic_was_started);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! clusterlicense protects against:
//! - **Forged uploads** - licenses that do not verify are refused
//! - **State tampering** - persisted and replicated licenses are re-verified
//! - **Lost updates** - commits against a stale generation are refused
//!
//! clusterlicense does **not** prevent binary patching. The internal signing
//! key ships with the product, so self-generated licenses only prove they
//! came from some copy of it.
//!
//! ## Configuration
//!
//! - `self_signing_key_hex` - internal Ed25519 seed (64 hex chars)
//! - `issuer_public_key_hex` - issuing authority's Ed25519 key (64 hex chars)
//! - `basic_duration` - lifetime of self-generated basic licenses
//! - `max_update_attempts` - compare-and-set attempts per transition
//!
//! See [`LicensingConfig`] for full documentation.

#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/clusterlicense/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// License values and their wire formats
pub mod codec;
pub mod license;

// Crypto layer
pub mod crypto;

// Store layer
pub mod store;

// State machine
pub mod transition;

// Protocol layer
pub mod protocol;

// Coordinator (main public API)
pub mod coordinator;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::LicensingConfig;
pub use coordinator::LicenseCoordinator;
pub use crypto::{LicenseSigner, LicenseVerifier};
pub use errors::LicenseError;
pub use license::{License, LicenseCategory, LicenseStatus, LicenseType};
pub use store::{ClusterLicenseState, ClusterLicenseStore, LicenseStore, Replicator};
pub use transition::{TransitionRequest, TransitionResult};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
