//! Generation-checked license store shared by every node of the cluster.
//!
//! Readers take an `Arc` snapshot and never block on writers for longer than
//! a pointer swap. Writers serialize on a commit mutex; the generation check
//! inside it is the single serialization point for license transitions.
//!
//! In a multi-node cluster exactly one store is the leader. Follower stores
//! are built [`with_leader`](ClusterLicenseStore::with_leader): they forward
//! every compare-and-set to the leader and only change their local copy when
//! the leader's commit is replicated back through
//! [`apply_replicated`](ClusterLicenseStore::apply_replicated). Generations
//! are therefore assigned by one authority and replicas converge.

use crate::clock::Clock;
use crate::crypto::digest::license_fingerprint;
use crate::crypto::LicenseVerifier;
use crate::license::License;
use crate::store::file::StateFile;
use crate::store::format::StateRecord;
use crate::store::state::ClusterLicenseState;
use crate::store::{LicenseStore, NoopReplicator, Replicator};
use crate::LicenseError;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// License store with local persistence and cluster propagation.
pub struct ClusterLicenseStore {
    current: RwLock<Arc<ClusterLicenseState>>,
    commit_lock: Mutex<()>,
    file: Option<StateFile>,
    verifier: LicenseVerifier,
    clock: Arc<dyn Clock>,
    replicator: Arc<dyn Replicator>,
    leader: Option<Arc<dyn LicenseStore>>,
    updates: watch::Sender<Arc<ClusterLicenseState>>,
}

impl ClusterLicenseStore {
    /// Create an empty, non-persistent store.
    pub fn in_memory(verifier: LicenseVerifier, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(ClusterLicenseState::empty(), None, verifier, clock)
    }

    /// Open a persistent store, restoring whatever the file holds.
    ///
    /// # Errors
    /// * `StoreIO` - file unreadable or not a state record
    /// * `StoreTampered` - persisted license no longer verifies
    pub fn open(
        file: StateFile,
        verifier: LicenseVerifier,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseError> {
        let state = match file.load()? {
            Some(record) => record.into_state(&verifier)?,
            None => ClusterLicenseState::empty(),
        };
        info!(
            path = %file.path().display(),
            generation = state.generation,
            has_license = state.license.is_some(),
            "restored license state"
        );
        Ok(Self::from_state(state, Some(file), verifier, clock))
    }

    fn from_state(
        state: ClusterLicenseState,
        file: Option<StateFile>,
        verifier: LicenseVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = Arc::new(state);
        let (updates, _) = watch::channel(Arc::clone(&state));
        Self {
            current: RwLock::new(state),
            commit_lock: Mutex::new(()),
            file,
            verifier,
            clock,
            replicator: Arc::new(NoopReplicator),
            leader: None,
            updates,
        }
    }

    /// Hand every local commit to the given cluster transport.
    pub fn with_replicator(mut self, replicator: Arc<dyn Replicator>) -> Self {
        self.replicator = replicator;
        self
    }

    /// Make this store a follower of `leader`.
    ///
    /// Compare-and-set is forwarded to the leader, which owns generation
    /// numbering. The local copy changes only through replicated states.
    pub fn with_leader(mut self, leader: Arc<dyn LicenseStore>) -> Self {
        self.leader = Some(leader);
        self
    }

    /// Whether writes are forwarded to another store.
    pub fn is_follower(&self) -> bool {
        self.leader.is_some()
    }

    /// Receive every state this node commits or applies, latest first.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ClusterLicenseState>> {
        self.updates.subscribe()
    }

    /// Apply a state committed on another node.
    ///
    /// Only strictly newer generations are applied, so the local generation
    /// never regresses however replicas are reordered or duplicated.
    /// Returns whether the state was applied.
    ///
    /// # Errors
    /// * `InvalidSignature` - the replicated license does not verify
    /// * `StoreIO` - persisting the applied state failed
    pub fn apply_replicated(&self, incoming: ClusterLicenseState) -> Result<bool, LicenseError> {
        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let local_generation = self.snapshot().generation;
        if incoming.generation <= local_generation {
            debug!(
                incoming = incoming.generation,
                local = local_generation,
                "ignoring stale replicated license state"
            );
            return Ok(false);
        }

        if let Some(license) = incoming.license.as_ref() {
            if let Err(e) = self.verifier.verify_strict(license) {
                warn!(
                    generation = incoming.generation,
                    uid = license.uid(),
                    "rejecting replicated license with invalid signature"
                );
                return Err(e);
            }
        }

        self.install(incoming)?;
        Ok(true)
    }

    fn snapshot(&self) -> Arc<ClusterLicenseState> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Persist, swap in, and publish a new state. Caller holds the commit lock.
    fn install(
        &self,
        state: ClusterLicenseState,
    ) -> Result<Arc<ClusterLicenseState>, LicenseError> {
        if let Some(file) = self.file.as_ref() {
            file.save(&StateRecord::from_state(&state))?;
        }

        let state = Arc::new(state);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&state);
        self.updates.send_replace(Arc::clone(&state));

        let license_type = state.license.as_ref().map(|l| l.license_type().as_str());
        let fingerprint = state.license.as_ref().map(license_fingerprint);
        info!(
            generation = state.generation,
            license_type,
            fingerprint = fingerprint.as_deref(),
            "license state committed"
        );
        Ok(state)
    }
}

impl LicenseStore for ClusterLicenseStore {
    fn get(&self) -> Arc<ClusterLicenseState> {
        self.snapshot()
    }

    fn compare_and_set(
        &self,
        expected_generation: u64,
        license: Option<License>,
    ) -> Result<bool, LicenseError> {
        if let Some(license) = license.as_ref() {
            self.verifier.verify_strict(license)?;
        }

        if let Some(leader) = self.leader.as_ref() {
            let committed = leader.compare_and_set(expected_generation, license)?;
            debug!(
                expected = expected_generation,
                committed, "license compare-and-set forwarded to leader"
            );
            return Ok(committed);
        }

        let committed = {
            let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

            let local_generation = self.snapshot().generation;
            if local_generation != expected_generation {
                debug!(
                    expected = expected_generation,
                    actual = local_generation,
                    "license compare-and-set lost"
                );
                return Ok(false);
            }

            let generation = expected_generation.checked_add(1).ok_or_else(|| {
                LicenseError::StoreIO("license generation counter exhausted".to_string())
            })?;

            self.install(ClusterLicenseState {
                license,
                generation,
                last_update_time: Some(self.clock.now_utc()),
            })?
        };

        self.replicator.replicate(&committed);
        Ok(true)
    }
}
