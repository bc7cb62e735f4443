//! License value types and expiry policy.

pub mod expiry;
pub mod model;

pub use model::{
    License, LicenseCategory, LicenseDraft, LicenseStatus, LicenseType, SELF_ISSUER,
    VERSION_CURRENT, VERSION_START,
};
