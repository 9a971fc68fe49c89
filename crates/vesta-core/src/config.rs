//! Engine configuration.

use serde::Deserialize;

/// Configuration for a [`Notebook`](crate::Notebook).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on invalidation rounds within a single rebuild.
    ///
    /// Every round demotes at least one cell, so a notebook with `n` cells
    /// never needs more than `n + 1` rounds.
    pub max_rebuild_rounds: usize,

    /// Cancel the in-flight run of a pending cell when it is demoted to
    /// stale. When false the run is detached and its result discarded.
    pub cancel_invalidated_runs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rebuild_rounds: 1024,
            cancel_invalidated_runs: true,
        }
    }
}
