//! Shared fixtures for integration tests.

#![allow(dead_code)]

use clusterlicense::license::{LicenseDraft, SELF_ISSUER};
use clusterlicense::{
    ClusterLicenseStore, License, LicenseCoordinator, LicenseSigner, LicenseType,
    LicensingConfig, SystemClock,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// RFC 8032 test vector 1 seed, used as the internal signing key.
pub const SELF_SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

/// RFC 8032 test vector 2 seed, used as the external issuer.
pub const ISSUER_SEED_HEX: &str =
    "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";

pub fn issuer() -> LicenseSigner {
    LicenseSigner::from_hex(ISSUER_SEED_HEX).unwrap()
}

pub fn config() -> LicensingConfig {
    let mut config = LicensingConfig::new(SELF_SEED_HEX, issuer().verifying_key_hex());
    config.cluster_name = "integration-cluster".to_string();
    config
}

pub fn in_memory_store(config: &LicensingConfig) -> Arc<ClusterLicenseStore> {
    Arc::new(ClusterLicenseStore::in_memory(
        config.verifier().unwrap(),
        Arc::new(SystemClock),
    ))
}

pub fn coordinator() -> LicenseCoordinator {
    let config = config();
    let store = in_memory_store(&config);
    LicenseCoordinator::new(config, store).unwrap()
}

/// Paid license signed by the external issuer.
pub fn issued(license_type: LicenseType) -> License {
    let now = Utc::now();
    issuer().sign_license(
        LicenseDraft {
            uid: format!("issued-{}", license_type),
            license_type,
            issue_date: now,
            expiry_date: now + Duration::days(365),
            issued_to: "acme".to_string(),
            issuer: "issuer-authority".to_string(),
            max_nodes: 10,
        }
        .build(),
    )
}

/// Unsigned self-issued license with the given fields.
pub fn self_issued_draft(license_type: LicenseType, issued_to: &str) -> License {
    let now = Utc::now();
    LicenseDraft {
        uid: format!("draft-{}", license_type),
        license_type,
        issue_date: now,
        expiry_date: now + Duration::days(30),
        issued_to: issued_to.to_string(),
        issuer: SELF_ISSUER.to_string(),
        max_nodes: 1,
    }
    .build()
}

/// Install a self-generated trial the way an operator would: issue, then upload.
pub fn install_trial(coordinator: &LicenseCoordinator) {
    let trial = coordinator
        .issue_license(
            LicenseType::Trial,
            "integration-cluster",
            clusterlicense::license::expiry::DEFAULT_EXPIRY_SENTINEL,
        )
        .unwrap();
    let bytes = clusterlicense::codec::to_envelope_bytes(&trial).unwrap();
    coordinator.put_license(&bytes).unwrap();
}
