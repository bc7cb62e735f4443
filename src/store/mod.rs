//! License store: the single current license of the cluster.

pub mod cluster;
pub mod file;
pub mod format;
pub mod state;

use crate::license::License;
use crate::LicenseError;
use std::sync::Arc;

pub use cluster::ClusterLicenseStore;
pub use file::StateFile;
pub use state::ClusterLicenseState;

/// Read/write contract of the license store.
pub trait LicenseStore: Send + Sync {
    /// Latest locally known state. Never blocks on the network.
    fn get(&self) -> Arc<ClusterLicenseState>;

    /// Commit `license` if the local generation equals `expected_generation`.
    ///
    /// Returns `Ok(false)` when another commit got there first; the caller
    /// must re-read and decide again.
    fn compare_and_set(
        &self,
        expected_generation: u64,
        license: Option<License>,
    ) -> Result<bool, LicenseError>;
}

/// Cluster transport that carries local commits to the other nodes.
///
/// Called after every successful local commit. Must not block; delivery is
/// fire-and-forget and receivers apply states with
/// [`ClusterLicenseStore::apply_replicated`].
pub trait Replicator: Send + Sync {
    /// Ship a committed state to the rest of the cluster.
    fn replicate(&self, state: &ClusterLicenseState);
}

/// Replicator for single-node deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReplicator;

impl Replicator for NoopReplicator {
    fn replicate(&self, _state: &ClusterLicenseState) {}
}
