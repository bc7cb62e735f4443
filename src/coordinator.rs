//! License coordinator - the main public API.
//!
//! The `LicenseCoordinator` runs every license change through the same
//! pipeline:
//! 1. Read the current state from the store
//! 2. Ask the state machine for a decision
//! 3. Sign self-generated licenses
//! 4. Commit with compare-and-set, retrying from step 1 when another
//!    commit won the race

use crate::clock::{Clock, SystemClock};
use crate::codec::from_envelope_bytes;
use crate::config::LicensingConfig;
use crate::crypto::{LicenseSigner, LicenseVerifier};
use crate::license::expiry::resolve_expiry;
use crate::license::{License, LicenseType};
use crate::protocol::{
    DeleteLicenseResponse, GetBasicStatusResponse, GetLicenseResponse, LicenseView,
    PostStartBasicResponse, PutLicenseResponse,
};
use crate::store::{ClusterLicenseStore, LicenseStore, StateFile};
use crate::transition::machine::self_generated_license;
use crate::transition::{
    decide, eligible_to_start_basic, Decision, DecisionContext, TransitionRequest,
    TransitionResult,
};
use crate::LicenseError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinates license transitions for one node.
///
/// Create one instance per node and share it; all methods take `&self`.
pub struct LicenseCoordinator {
    config: LicensingConfig,
    clock: Arc<dyn Clock>,
    signer: LicenseSigner,
    verifier: LicenseVerifier,
    store: Arc<dyn LicenseStore>,
}

impl LicenseCoordinator {
    /// Create a coordinator over an existing store.
    ///
    /// Uses the system clock for time operations.
    ///
    /// # Errors
    /// Returns `ConfigError` if configuration validation or key decoding fails.
    pub fn new(
        config: LicensingConfig,
        store: Arc<dyn LicenseStore>,
    ) -> Result<Self, LicenseError> {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Create a coordinator over a persistent store in the platform data dir.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The state directory cannot be created
    /// - The persisted state is unreadable or tampered with
    pub fn open(config: LicensingConfig) -> Result<Self, LicenseError> {
        config.validate()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = ClusterLicenseStore::open(
            StateFile::new(&config.state_namespace)?,
            config.verifier()?,
            Arc::clone(&clock),
        )?;
        Self::with_clock(config, Arc::new(store), clock)
    }

    /// Create a coordinator with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: LicensingConfig,
        store: Arc<dyn LicenseStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseError> {
        Self::with_clock(config, store, clock)
    }

    fn with_clock(
        config: LicensingConfig,
        store: Arc<dyn LicenseStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseError> {
        config.validate()?;
        let signer = config.signer()?;
        let verifier = config.verifier()?;

        Ok(Self {
            config,
            clock,
            signer,
            verifier,
            store,
        })
    }

    /// Current license, if any.
    pub fn get_license(&self) -> Option<License> {
        self.store.get().license.clone()
    }

    /// Current license rendered for the REST layer.
    pub fn get_license_response(&self) -> GetLicenseResponse {
        let now = self.clock.now_utc();
        GetLicenseResponse {
            license: self
                .store
                .get()
                .license
                .as_ref()
                .map(|license| LicenseView::new(license, now)),
        }
    }

    /// Install an uploaded license envelope.
    ///
    /// # Errors
    /// - `MalformedLicense` - bytes are not a decodable envelope
    /// - `InvalidSignature` - license does not verify
    /// - `ConcurrentUpdate` - kept losing against concurrent transitions
    pub fn put_license(&self, signed_bytes: &[u8]) -> Result<PutLicenseResponse, LicenseError> {
        let license = from_envelope_bytes(signed_bytes)?;
        let license_status = license.status(self.clock.now_utc());
        let result = self.transition(TransitionRequest::PutLicense { license })?;

        Ok(PutLicenseResponse {
            acknowledged: result.acknowledged,
            license_status,
            messages: result.warning_messages,
        })
    }

    /// Remove the current license.
    ///
    /// # Errors
    /// - `ConcurrentUpdate` - kept losing against concurrent transitions
    pub fn delete_license(&self) -> Result<DeleteLicenseResponse, LicenseError> {
        let result = self.transition(TransitionRequest::DeleteLicense)?;
        Ok(DeleteLicenseResponse {
            acknowledged: result.acknowledged,
        })
    }

    /// Whether starting a basic license would change anything. No side effects.
    pub fn get_basic_status(&self) -> GetBasicStatusResponse {
        GetBasicStatusResponse {
            eligible_to_start_basic: eligible_to_start_basic(&self.store.get()),
        }
    }

    /// Replace the current license with a self-generated basic license.
    ///
    /// "Already basic" and "needs acknowledgement" come back as structured
    /// responses, not errors.
    ///
    /// # Errors
    /// - `ConcurrentUpdate` - kept losing against concurrent transitions
    pub fn start_basic(&self, acknowledge: bool) -> Result<PostStartBasicResponse, LicenseError> {
        self.transition(TransitionRequest::start_basic(acknowledge))
            .map(PostStartBasicResponse::from)
    }

    /// Sign a self-generated license without installing it.
    ///
    /// `expiry_millis` may be
    /// [`DEFAULT_EXPIRY_SENTINEL`](crate::license::expiry::DEFAULT_EXPIRY_SENTINEL).
    ///
    /// # Errors
    /// - `NotSelfGenerated` - `license_type` is a paid type
    /// - `MalformedLicense` - expiry out of range
    pub fn issue_license(
        &self,
        license_type: LicenseType,
        issued_to: &str,
        expiry_millis: i64,
    ) -> Result<License, LicenseError> {
        let now = self.clock.now_utc();
        let expiry = resolve_expiry(license_type, now, expiry_millis, self.config.basic_duration)?;
        let license = self_generated_license(
            license_type,
            issued_to,
            now,
            Some(expiry),
            self.config.basic_duration,
            self.store.get().generation,
        )?;
        Ok(self.signer.sign_license(license))
    }

    /// Run a transition to completion.
    ///
    /// # Errors
    /// - `InvalidSignature` - uploaded license does not verify (never retried)
    /// - `MalformedLicense` - requested basic duration is unusable (never retried)
    /// - `ConcurrentUpdate` - every attempt lost its compare-and-set
    pub fn transition(&self, request: TransitionRequest) -> Result<TransitionResult, LicenseError> {
        let max_attempts = self.config.max_update_attempts;

        for attempt in 1..=max_attempts {
            let current = self.store.get();
            let ctx = DecisionContext {
                now: self.clock.now_utc(),
                basic_duration: self.config.basic_duration,
                cluster_name: &self.config.cluster_name,
                verifier: &self.verifier,
            };

            let license = match decide(&current, &request, &ctx)? {
                Decision::Applied { license } => license,
                Decision::NeedsAcknowledgement { messages } => {
                    debug!(
                        request = request.name(),
                        generation = current.generation,
                        "license transition needs acknowledgement"
                    );
                    return Ok(TransitionResult::needs_acknowledgement(messages));
                }
                Decision::Rejected { reason } => {
                    debug!(
                        request = request.name(),
                        generation = current.generation,
                        reason = reason.message(),
                        "license transition rejected"
                    );
                    return Ok(TransitionResult::rejected(reason));
                }
            };

            let license = license.map(|license| {
                if license.is_self_issued() && !license.is_signed() {
                    self.signer.sign_license(license)
                } else {
                    license
                }
            });

            if self
                .store
                .compare_and_set(current.generation, license.clone())?
            {
                info!(
                    request = request.name(),
                    generation = current.generation + 1,
                    license_type = license.as_ref().map(|l| l.license_type().as_str()),
                    attempt,
                    "license transition applied"
                );
                return Ok(TransitionResult::applied(license));
            }

            debug!(
                request = request.name(),
                attempt,
                max_attempts,
                "concurrent license update, retrying from a fresh read"
            );
        }

        warn!(
            request = request.name(),
            attempts = max_attempts,
            "license transition gave up after repeated concurrent updates"
        );
        Err(LicenseError::ConcurrentUpdate {
            attempts: max_attempts,
        })
    }

    /// The store transitions are committed to.
    pub fn store(&self) -> &Arc<dyn LicenseStore> {
        &self.store
    }

    /// Verifier for uploaded and replicated licenses.
    pub fn verifier(&self) -> &LicenseVerifier {
        &self.verifier
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LicensingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::codec::to_envelope_bytes;
    use crate::license::expiry::{BASIC_LICENSE_DURATION, DEFAULT_EXPIRY_SENTINEL};
    use crate::license::{LicenseDraft, LicenseStatus};
    use crate::store::ClusterLicenseState;
    use crate::transition::acknowledgement::ACKNOWLEDGEMENT_HEADER;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    const SELF_SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const ISSUER_SEED_HEX: &str =
        "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";

    fn issuer() -> LicenseSigner {
        LicenseSigner::from_hex(ISSUER_SEED_HEX).unwrap()
    }

    fn test_config() -> LicensingConfig {
        let mut config = LicensingConfig::new(SELF_SEED_HEX, issuer().verifying_key_hex());
        config.cluster_name = "test-cluster".to_string();
        config
    }

    fn clock() -> MockClock {
        MockClock::new(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap())
    }

    fn coordinator(clock: &MockClock) -> LicenseCoordinator {
        let config = test_config();
        let clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let store = ClusterLicenseStore::in_memory(config.verifier().unwrap(), Arc::clone(&clock));
        LicenseCoordinator::new_with_clock(config, Arc::new(store), clock).unwrap()
    }

    fn issued(license_type: LicenseType, clock: &MockClock) -> License {
        let now = clock.now_utc();
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

    /// Store whose compare-and-set always loses.
    struct ContendedStore {
        attempts: AtomicU32,
    }

    impl LicenseStore for ContendedStore {
        fn get(&self) -> Arc<ClusterLicenseState> {
            Arc::new(ClusterLicenseState::empty())
        }

        fn compare_and_set(
            &self,
            _expected_generation: u64,
            _license: Option<License>,
        ) -> Result<bool, LicenseError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = test_config();
        config.self_signing_key_hex = "abcd".to_string();
        let store = ClusterLicenseStore::in_memory(
            test_config().verifier().unwrap(),
            Arc::new(SystemClock),
        );
        let result = LicenseCoordinator::new(config, Arc::new(store));
        assert!(matches!(result, Err(LicenseError::ConfigError(_))));
    }

    #[test]
    fn put_get_delete() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        let gold = issued(LicenseType::Gold, &clock);

        let response = coordinator
            .put_license(&to_envelope_bytes(&gold).unwrap())
            .unwrap();
        assert!(response.acknowledged);
        assert_eq!(response.license_status, LicenseStatus::Active);
        assert_eq!(coordinator.get_license(), Some(gold));

        assert!(coordinator.delete_license().unwrap().acknowledged);
        assert!(coordinator.get_license().is_none());
        assert!(coordinator.get_license_response().license.is_none());
    }

    #[test]
    fn put_garbage_is_malformed_and_changes_nothing() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        let result = coordinator.put_license(b"{\"payload\":\"AAAA\",\"signature\":\"\"}");
        assert!(matches!(result, Err(LicenseError::MalformedLicense(_))));
        assert_eq!(coordinator.store().get().generation, 0);
    }

    #[test]
    fn put_forged_license_is_invalid_signature() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        let forged = issued(LicenseType::Platinum, &clock).with_signature(vec![0u8; 64]);
        let result = coordinator.put_license(&to_envelope_bytes(&forged).unwrap());
        assert!(matches!(result, Err(LicenseError::InvalidSignature)));
        assert!(coordinator.get_license().is_none());
    }

    #[test]
    fn start_basic_from_none_applies_signed_basic() {
        let clock = clock();
        let coordinator = coordinator(&clock);

        let response = coordinator.start_basic(false).unwrap();
        assert!(response.acknowledged);
        assert!(response.basic_was_started);

        let license = coordinator.get_license().unwrap();
        assert_eq!(license.license_type(), LicenseType::Basic);
        assert_eq!(license.expiry_date(), clock.now_utc() + BASIC_LICENSE_DURATION);
        assert!(coordinator.verifier().verify(&license));
    }

    #[test]
    fn unacknowledged_start_basic_from_gold_changes_nothing() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        let gold = issued(LicenseType::Gold, &clock);
        coordinator
            .put_license(&to_envelope_bytes(&gold).unwrap())
            .unwrap();
        let before = coordinator.store().get();

        let response = coordinator.start_basic(false).unwrap();
        assert!(!response.acknowledged);
        assert!(!response.basic_was_started);
        assert_eq!(response.messages()[0], ACKNOWLEDGEMENT_HEADER);

        assert_eq!(coordinator.store().get(), before);
    }

    #[test]
    fn exhausted_retries_are_concurrent_update() {
        let store = Arc::new(ContendedStore {
            attempts: AtomicU32::new(0),
        });
        let clock: Arc<dyn Clock> = Arc::new(clock());
        let coordinator =
            LicenseCoordinator::new_with_clock(test_config(), store.clone(), clock).unwrap();

        let result = coordinator.start_basic(true);
        match result {
            Err(e @ LicenseError::ConcurrentUpdate { attempts: 5 }) => assert!(e.is_retryable()),
            other => panic!("expected concurrent update, got {:?}", other),
        }
        assert_eq!(store.attempts.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn issue_license_signs_self_generated_trial() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        let trial = coordinator
            .issue_license(LicenseType::Trial, "acme", DEFAULT_EXPIRY_SENTINEL)
            .unwrap();
        assert!(trial.is_self_issued());
        assert!(coordinator.verifier().verify(&trial));
        assert_eq!(trial.expiry_date(), clock.now_utc() + Duration::days(30));
        assert!(coordinator.get_license().is_none());
    }

    #[test]
    fn huge_requested_duration_is_an_error_not_a_panic() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        for duration in [Duration::MAX, Duration::days(-1)] {
            let result = coordinator.transition(TransitionRequest::StartBasic {
                acknowledged: true,
                requested_duration: Some(duration),
            });
            assert!(matches!(result, Err(LicenseError::MalformedLicense(_))));
        }
        assert_eq!(coordinator.store().get().generation, 0);
    }

    #[test]
    fn issue_license_refuses_paid_types() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        let result = coordinator.issue_license(LicenseType::Platinum, "acme", DEFAULT_EXPIRY_SENTINEL);
        assert!(matches!(result, Err(LicenseError::NotSelfGenerated { .. })));
    }

    #[test]
    fn get_license_response_reports_expiry() {
        let clock = clock();
        let coordinator = coordinator(&clock);
        coordinator.start_basic(true).unwrap();
        clock.advance(BASIC_LICENSE_DURATION + Duration::seconds(1));

        let view = coordinator.get_license_response().license.unwrap();
        assert_eq!(view.status, LicenseStatus::Expired);
        assert_eq!(view.license_type, LicenseType::Basic);
    }
}
