//! # Independent Spanning Trees on Bubble-Sort Networks
//!
//! This library builds n - 1 independent spanning trees rooted at the
//! identity permutation of the bubble-sort network B_n, and verifies them.
//!
//! ## Core Algorithm
//!
//! 1. **Codec**: vertices are permutations, addressed by their lexicographic
//!    rank in the factorial number system
//! 2. **Network**: B_n stored as a compressed adjacency list, one edge per
//!    adjacent transposition
//! 3. **Parent rule**: each vertex picks its parent in tree `t` locally, by
//!    moving one symbol one position to the right
//! 4. **Construction**: rows of parents are independent, so they split across
//!    workers and threads and merge through an all-gather
//! 5. **Verification**: every tree spans, and root paths in different trees
//!    share only their endpoints
//!
//! ## Usage Example
//!
//! ```no_run
//! use bubble_ist::{ConstructionConfig, IstBuilder};
//!
//! let report = IstBuilder::new(ConstructionConfig::hybrid(6, 2, 4)).run()?;
//! assert!(report.is_verified());
//! println!("{}", report.forest.fingerprint());
//! # Ok::<(), bubble_ist::IstError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod config; // Construction parameters
pub mod construct; // Sequential and hybrid construction
pub mod network; // Bubble-sort network in CSR form
pub mod permutation; // Permutations and the rank codec
pub mod render; // Text listings of trees and paths
pub mod rule; // Parent rules
pub mod util; // Factorials and fallible allocation
pub mod verify; // Validity and independence checks

// Re-exports for convenience
pub use config::{ConstructionConfig, ConstructionMode};
pub use construct::{
    construct_distributed, construct_hybrid, construct_sequential, ChannelCollective, Collective,
    Forest, SpanningTree, NO_PARENT,
};
pub use network::BubbleSortNetwork;
pub use permutation::Permutation;
pub use rule::{compute_parent, ParentRule};
pub use verify::{check_independence, validate, verify_forest, Violation};

use std::collections::TryReserveError;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, instrument};

/// Errors that can occur while building or checking the trees
#[derive(Error, Debug)]
pub enum IstError {
    /// Dimension outside the range an operation supports
    #[error("Invalid dimension {dimension}: expected {min}..={max}")]
    InvalidDimension {
        /// Requested dimension
        dimension: usize,
        /// Smallest accepted dimension
        min: usize,
        /// Largest accepted dimension
        max: usize,
    },

    /// Rank not below n!
    #[error("Index {index} out of range for {limit} permutations")]
    IndexOutOfRange {
        /// Requested rank
        index: u64,
        /// n!
        limit: u64,
    },

    /// Symbols do not form a permutation of `1..=n`
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Symbol cannot move one position right
    #[error("Cannot move symbol {symbol} right: {reason}")]
    InvalidSwap {
        /// Symbol asked to move
        symbol: u8,
        /// What prevented the move
        reason: &'static str,
    },

    /// Tree index outside `1..n`
    #[error("Invalid tree index {tree}: expected 1..={max}")]
    InvalidTreeIndex {
        /// Requested tree
        tree: usize,
        /// n - 1
        max: usize,
    },

    /// Parent requested for the identity
    #[error("The root has no parent")]
    RootHasNoParent,

    /// Allocation failed
    #[error("Out of memory allocating {what}")]
    OutOfMemory {
        /// Buffer being allocated
        what: &'static str,
        /// Allocator error
        #[source]
        source: TryReserveError,
    },

    /// Zero workers or zero threads
    #[error("Invalid worker configuration: {0}")]
    InvalidWorkerCount(String),

    /// A peer gave up before posting its block
    #[error("Worker {worker} aborted the construction")]
    WorkerAborted {
        /// Aborting worker
        worker: usize,
    },

    /// Collective lost its peers or was misused
    #[error("Collective failure: {0}")]
    CollectiveDisconnected(String),

    /// Merged blocks do not tile the vertex range
    #[error("Merged blocks cover {covered} of {expected} vertices")]
    IncompleteMerge {
        /// Vertices covered contiguously from 0
        covered: usize,
        /// n!
        expected: usize,
    },

    /// Two workers ended up with different forests
    #[error("Worker {worker} merged a different forest")]
    MergeMismatch {
        /// Worker whose forest differs from worker 0
        worker: usize,
    },

    /// Forest failed verification
    #[error(transparent)]
    StructuralViolation(#[from] Violation),
}

/// Builds the network and forest described by a [`ConstructionConfig`].
#[derive(Debug, Clone)]
pub struct IstBuilder {
    config: ConstructionConfig,
}

/// Everything one run produced, with phase timings.
#[derive(Debug)]
pub struct ConstructionReport {
    /// The network B_n
    pub network: BubbleSortNetwork,

    /// The n - 1 trees
    pub forest: Forest,

    /// Time spent building the network
    pub network_elapsed: Duration,

    /// Time spent computing parents and merging
    pub construction_elapsed: Duration,

    /// Verifier outcome, `None` when verification was skipped
    pub verification: Option<Result<(), Violation>>,

    /// Time spent verifying
    pub verification_elapsed: Duration,
}

impl ConstructionReport {
    /// Whether verification ran and passed.
    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Some(Ok(())))
    }
}

impl IstBuilder {
    /// Create a builder for `config`.
    pub fn new(config: ConstructionConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ConstructionConfig {
        &self.config
    }

    /// Build the network, construct the forest, and verify it if enabled.
    ///
    /// A failed verification is reported in
    /// [`ConstructionReport::verification`], not as an error, so callers can
    /// still inspect the forest.
    #[instrument(level = "debug", skip(self), fields(dimension = self.config.dimension))]
    pub fn run(&self) -> Result<ConstructionReport, IstError> {
        self.config.validate()?;
        let config = &self.config;

        let started = Instant::now();
        let network = BubbleSortNetwork::build(config.dimension)?;
        let network_elapsed = started.elapsed();
        info!(
            vertices = network.vertex_count(),
            edges = network.edge_count(),
            ?network_elapsed,
            "network built"
        );

        let started = Instant::now();
        let forest = match config.mode {
            ConstructionMode::Sequential => construct_sequential(&network, config.rule)?,
            ConstructionMode::Hybrid { workers, threads } => {
                construct_hybrid(&network, workers, threads, config.rule)?
            }
        };
        let construction_elapsed = started.elapsed();
        info!(
            trees = forest.tree_count(),
            rule = config.rule.name(),
            ?construction_elapsed,
            "trees constructed"
        );

        let started = Instant::now();
        let verification = config.verify.then(|| verify_forest(&forest, &network));
        let verification_elapsed = started.elapsed();

        Ok(ConstructionReport {
            network,
            forest,
            network_elapsed,
            construction_elapsed,
            verification,
            verification_elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_runs_sequential() {
        let report = IstBuilder::new(ConstructionConfig::sequential(4)).run().unwrap();
        assert!(report.is_verified());
        assert_eq!(report.forest.tree_count(), 3);
        assert_eq!(report.network.vertex_count(), 24);
    }

    #[test]
    fn test_builder_skips_verification() {
        let config = ConstructionConfig::hybrid(5, 2, 2).with_verification(false);
        let report = IstBuilder::new(config).run().unwrap();
        assert!(report.verification.is_none());
        assert!(!report.is_verified());
    }

    #[test]
    fn test_builder_reports_published_failure() {
        let config = ConstructionConfig::sequential(5).with_rule(ParentRule::Published);
        let report = IstBuilder::new(config).run().unwrap();
        assert!(matches!(report.verification, Some(Err(Violation::Cycle { .. }))));
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        assert!(matches!(
            IstBuilder::new(ConstructionConfig::sequential(2)).run(),
            Err(IstError::InvalidDimension { dimension: 2, .. })
        ));
    }
}
