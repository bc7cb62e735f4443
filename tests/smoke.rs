//! Basic smoke test to verify the public API is reachable.

mod common;

#[test]
fn crate_compiles() {
    // If this test runs, the crate skeleton is valid.
    let _ = std::any::type_name::<clusterlicense::LicensingConfig>();
    let _ = std::any::type_name::<clusterlicense::LicenseError>();
    let _ = std::any::type_name::<clusterlicense::LicenseCoordinator>();
}

#[test]
fn fresh_coordinator_has_no_license() {
    let coordinator = common::coordinator();
    assert!(coordinator.get_license().is_none());
    assert!(coordinator.get_basic_status().eligible_to_start_basic);
    assert_eq!(
        serde_json::to_string(&coordinator.get_license_response()).unwrap(),
        "{\"license\":null}"
    );
}
