//! Spanning-tree construction
//!
//! Parents are computed row by row: one row per vertex, holding that vertex's
//! parent in each of the n - 1 trees. Rows are independent, so any split of
//! the vertex range gives every `(tree, vertex)` slot exactly one writer.
//! The sequential mode fills all rows on the calling thread; the hybrid mode
//! splits them into worker blocks and thread chunks, then merges the blocks
//! through a [`Collective`].

mod collective;
mod hybrid;
mod partition;

pub use collective::{Block, ChannelCollective, Collective};
pub use hybrid::{construct_distributed, construct_hybrid};
pub use partition::{block_range, block_ranges};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::network::{BubbleSortNetwork, MAX_NETWORK_DIMENSION, ROOT};
use crate::permutation::Permutation;
use crate::rule::ParentRule;
use crate::util::{try_filled, try_with_capacity};
use crate::IstError;

/// Parent entry of the root.
pub const NO_PARENT: u32 = u32::MAX;

/// Smallest dimension with more than one tree.
pub const MIN_CONSTRUCTION_DIMENSION: usize = 3;

/// One rooted spanning tree as a parent array.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpanningTree {
    index: usize,
    parent: Vec<u32>,
}

impl SpanningTree {
    /// Wrap a parent array for tree `index` (1-based).
    pub fn from_parents(index: usize, parent: Vec<u32>) -> Self {
        Self { index, parent }
    }

    /// Tree index t in `1..n`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of vertices covered.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the tree covers no vertices.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Parent of `vertex`, or `None` for the root and unknown vertices.
    pub fn parent(&self, vertex: usize) -> Option<usize> {
        self.parent
            .get(vertex)
            .copied()
            .filter(|&parent| parent != NO_PARENT)
            .map(|parent| parent as usize)
    }

    /// Raw parent array; the root holds [`NO_PARENT`].
    pub fn parents(&self) -> &[u32] {
        &self.parent
    }

    /// Vertices from `vertex` to the root, both included.
    ///
    /// Returns `None` if the walk leaves the tree or fails to reach the root
    /// within `len()` steps.
    pub fn path_to_root(&self, vertex: usize) -> Option<Vec<usize>> {
        if vertex >= self.len() {
            return None;
        }
        let mut path = vec![vertex];
        let mut current = vertex;
        while current != ROOT {
            current = self.parent(current)?;
            if current >= self.len() || path.len() >= self.len() {
                return None;
            }
            path.push(current);
        }
        Some(path)
    }
}

/// The n - 1 spanning trees of B_n, indexed from 1.
///
/// A constructed forest is read-only; altered copies go through
/// [`Forest::from_trees`].
///
/// ```compile_fail
/// # use bubble_ist::{construct_sequential, BubbleSortNetwork, ParentRule};
/// let network = BubbleSortNetwork::build(3).unwrap();
/// let mut forest = construct_sequential(&network, ParentRule::Recursive).unwrap();
/// forest.trees_mut()[0] = forest.trees()[1].clone();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Forest {
    dimension: usize,
    trees: Vec<SpanningTree>,
}

impl Forest {
    /// Assemble a forest from trees ordered by index.
    pub fn from_trees(dimension: usize, trees: Vec<SpanningTree>) -> Self {
        Self { dimension, trees }
    }

    /// Dimension n of the underlying network.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of trees, n - 1 for a constructed forest.
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Vertices per tree.
    pub fn vertex_count(&self) -> usize {
        self.trees.first().map_or(0, SpanningTree::len)
    }

    /// Tree `t` for `t` in `1..n`.
    pub fn tree(&self, index: usize) -> Option<&SpanningTree> {
        index.checked_sub(1).and_then(|i| self.trees.get(i))
    }

    /// All trees in index order.
    pub fn trees(&self) -> &[SpanningTree] {
        &self.trees
    }

    /// BLAKE3 digest over the dimension and every parent array, in tree order.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.dimension as u64).to_le_bytes());
        for tree in &self.trees {
            hasher.update(&(tree.index as u64).to_le_bytes());
            for parent in &tree.parent {
                hasher.update(&parent.to_le_bytes());
            }
        }
        hasher.finalize()
    }
}

/// Build every tree on the calling thread.
#[instrument(level = "debug", skip(network), fields(dimension = network.dimension()))]
pub fn construct_sequential(
    network: &BubbleSortNetwork,
    rule: ParentRule,
) -> Result<Forest, IstError> {
    check_constructible(network)?;
    let dimension = network.dimension();
    let vertex_count = network.vertex_count();

    let mut rows = try_filled(vertex_count * (dimension - 1), NO_PARENT, "parent rows")?;
    fill_rows(&mut rows, 0, dimension, rule)?;

    let block = Arc::new(Block {
        worker: 0,
        start: 0,
        rows,
    });
    let forest = assemble(dimension, vertex_count, &[block])?;
    debug!(trees = forest.tree_count(), "sequential construction finished");
    Ok(forest)
}

/// Reject networks too small for n - 1 >= 2 trees or too large for `u32` ids.
pub(crate) fn check_constructible(network: &BubbleSortNetwork) -> Result<(), IstError> {
    let dimension = network.dimension();
    if (MIN_CONSTRUCTION_DIMENSION..=MAX_NETWORK_DIMENSION).contains(&dimension) {
        Ok(())
    } else {
        Err(IstError::InvalidDimension {
            dimension,
            min: MIN_CONSTRUCTION_DIMENSION,
            max: MAX_NETWORK_DIMENSION,
        })
    }
}

/// Fill consecutive rows starting at vertex `first`.
pub(crate) fn fill_rows(
    rows: &mut [u32],
    first: usize,
    dimension: usize,
    rule: ParentRule,
) -> Result<(), IstError> {
    let trees = dimension - 1;
    for (offset, row) in rows.chunks_mut(trees).enumerate() {
        let vertex = first + offset;
        if vertex == ROOT {
            row.fill(NO_PARENT);
            continue;
        }
        let permutation = Permutation::unrank(vertex as u64, dimension)?;
        for (slot, tree) in row.iter_mut().zip(1..) {
            *slot = rule.compute_parent(&permutation, tree)?.rank() as u32;
        }
    }
    Ok(())
}

/// Transpose merged row blocks into per-tree parent arrays.
///
/// Blocks must tile `[0, vertex_count)` exactly once; their arrival order
/// does not matter.
pub(crate) fn assemble(
    dimension: usize,
    vertex_count: usize,
    blocks: &[Arc<Block>],
) -> Result<Forest, IstError> {
    let trees = dimension - 1;

    let mut ordered: Vec<&Block> = blocks.iter().map(Arc::as_ref).collect();
    ordered.sort_by_key(|block| block.start);
    let mut covered = 0;
    for block in &ordered {
        if block.start != covered || block.rows.len() % trees != 0 {
            return Err(IstError::IncompleteMerge {
                covered,
                expected: vertex_count,
            });
        }
        covered += block.rows.len() / trees;
    }
    if covered != vertex_count {
        return Err(IstError::IncompleteMerge {
            covered,
            expected: vertex_count,
        });
    }

    let mut parents = try_with_capacity::<Vec<u32>>(trees, "spanning trees")?;
    for _ in 0..trees {
        parents.push(try_filled(vertex_count, NO_PARENT, "parent array")?);
    }

    for block in ordered {
        for (offset, row) in block.rows.chunks(trees).enumerate() {
            let vertex = block.start + offset;
            for (tree, &parent) in row.iter().enumerate() {
                parents[tree][vertex] = parent;
            }
        }
    }

    let trees = parents
        .into_iter()
        .zip(1..)
        .map(|(parent, index)| SpanningTree::from_parents(index, parent))
        .collect();
    Ok(Forest::from_trees(dimension, trees))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_b3_forest() {
        let network = BubbleSortNetwork::build(3).unwrap();
        let forest = construct_sequential(&network, ParentRule::Recursive).unwrap();
        assert_eq!(forest.tree_count(), 2);
        assert_eq!(forest.vertex_count(), 6);
        for tree in forest.trees() {
            assert_eq!(tree.parent(ROOT), None);
            assert_eq!(tree.parents()[ROOT], NO_PARENT);
        }
    }

    #[test]
    fn test_rejects_small_dimension() {
        let network = BubbleSortNetwork::build(2).unwrap();
        assert!(matches!(
            construct_sequential(&network, ParentRule::Recursive),
            Err(IstError::InvalidDimension { dimension: 2, .. })
        ));
    }

    #[test]
    fn test_path_to_root() {
        let tree = SpanningTree::from_parents(1, vec![NO_PARENT, 0, 1]);
        assert_eq!(tree.path_to_root(2), Some(vec![2, 1, 0]));
        assert_eq!(tree.path_to_root(0), Some(vec![0]));
        assert_eq!(tree.path_to_root(3), None);

        let looping = SpanningTree::from_parents(1, vec![NO_PARENT, 2, 1]);
        assert_eq!(looping.path_to_root(1), None);
    }

    #[test]
    fn test_assemble_detects_gap() {
        let block = Arc::new(Block {
            worker: 1,
            start: 2,
            rows: vec![0; 8],
        });
        assert!(matches!(
            assemble(3, 6, &[block]),
            Err(IstError::IncompleteMerge { covered: 0, .. })
        ));
    }

    #[test]
    fn test_fingerprint_tracks_parents() {
        let network = BubbleSortNetwork::build(4).unwrap();
        let forest = construct_sequential(&network, ParentRule::Recursive).unwrap();
        let mut trees = forest.trees().to_vec();
        trees[0] = SpanningTree::from_parents(1, vec![NO_PARENT; 24]);
        let altered = Forest::from_trees(4, trees);
        assert_eq!(forest.fingerprint(), forest.clone().fingerprint());
        assert_ne!(forest.fingerprint(), altered.fingerprint());
    }
}
