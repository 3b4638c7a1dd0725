//! Construction configuration

use crate::construct::MIN_CONSTRUCTION_DIMENSION;
use crate::network::MAX_NETWORK_DIMENSION;
use crate::rule::ParentRule;
use crate::util::factorial;
use crate::IstError;

/// How parent rows are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionMode {
    /// Single thread, no collective.
    Sequential,
    /// `workers` distributed workers with `threads` local threads each.
    Hybrid {
        /// Number of workers joined by the collective
        workers: usize,
        /// Threads inside each worker
        threads: usize,
    },
}

/// Configuration parameters for one construction run
#[derive(Debug, Clone)]
pub struct ConstructionConfig {
    /// Dimension n of B_n
    pub dimension: usize,

    /// Scheduling of parent computation
    pub mode: ConstructionMode,

    /// Decision table used for parents
    pub rule: ParentRule,

    /// Run the verifier after construction
    pub verify: bool,
}

impl ConstructionConfig {
    /// Single-threaded construction with verification.
    pub fn sequential(dimension: usize) -> Self {
        Self {
            dimension,
            mode: ConstructionMode::Sequential,
            rule: ParentRule::default(),
            verify: true,
        }
    }

    /// Hybrid construction with verification.
    pub fn hybrid(dimension: usize, workers: usize, threads: usize) -> Self {
        Self {
            mode: ConstructionMode::Hybrid { workers, threads },
            ..Self::sequential(dimension)
        }
    }

    /// Replace the parent rule.
    pub fn with_rule(mut self, rule: ParentRule) -> Self {
        self.rule = rule;
        self
    }

    /// Enable or disable verification.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Number of trees, n - 1.
    pub fn tree_count(&self) -> usize {
        self.dimension.saturating_sub(1)
    }

    /// Number of vertices, n!.
    pub fn vertex_count(&self) -> Result<u64, IstError> {
        factorial(self.dimension)
    }

    /// Reject dimensions outside `3..=12` and empty worker pools.
    pub fn validate(&self) -> Result<(), IstError> {
        if !(MIN_CONSTRUCTION_DIMENSION..=MAX_NETWORK_DIMENSION).contains(&self.dimension) {
            return Err(IstError::InvalidDimension {
                dimension: self.dimension,
                min: MIN_CONSTRUCTION_DIMENSION,
                max: MAX_NETWORK_DIMENSION,
            });
        }
        if let ConstructionMode::Hybrid { workers, threads } = self.mode {
            if workers == 0 || threads == 0 {
                return Err(IstError::InvalidWorkerCount(format!(
                    "{} workers x {} threads",
                    workers, threads
                )));
            }
        }
        Ok(())
    }
}
