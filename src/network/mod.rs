//! Bubble-sort network B_n in compressed sparse row form
//!
//! Vertex `v` is the permutation of rank `v`. Its `n - 1` neighbours are the
//! permutations reached by one adjacent transposition, stored in swap-position
//! order at `adjacency[offsets[v]..offsets[v + 1]]`.

use tracing::{debug, instrument};

use crate::permutation::Permutation;
use crate::util::{factorial, try_with_capacity};
use crate::IstError;

/// Largest dimension whose vertex ids fit the `u32` storage used by the
/// network and the spanning trees.
pub const MAX_NETWORK_DIMENSION: usize = 12;

/// Vertex id of the identity permutation.
pub const ROOT: usize = 0;

/// Immutable CSR adjacency of B_n.
#[derive(Debug, Clone)]
pub struct BubbleSortNetwork {
    dimension: usize,
    offsets: Vec<usize>,
    adjacency: Vec<u32>,
}

impl BubbleSortNetwork {
    /// Build B_n for `n` in `1..=12`.
    ///
    /// Both CSR arrays are reserved before any vertex is expanded, so an
    /// allocation failure surfaces as [`IstError::OutOfMemory`] and no partial
    /// network escapes.
    #[instrument(level = "debug")]
    pub fn build(dimension: usize) -> Result<Self, IstError> {
        if !(1..=MAX_NETWORK_DIMENSION).contains(&dimension) {
            return Err(IstError::InvalidDimension {
                dimension,
                min: 1,
                max: MAX_NETWORK_DIMENSION,
            });
        }

        let vertex_count = factorial(dimension)? as usize;
        let degree = dimension - 1;

        let mut offsets = try_with_capacity(vertex_count + 1, "network offsets")?;
        let mut adjacency = try_with_capacity(vertex_count * degree, "network adjacency")?;

        offsets.push(0);
        for vertex in 0..vertex_count {
            let permutation = Permutation::unrank(vertex as u64, dimension)?;
            for position in 0..degree {
                let neighbor = permutation.with_adjacent_swap(position)?;
                adjacency.push(neighbor.rank() as u32);
            }
            offsets.push(adjacency.len());
        }

        debug!(
            vertices = vertex_count,
            edges = adjacency.len(),
            "built bubble-sort network"
        );

        Ok(Self {
            dimension,
            offsets,
            adjacency,
        })
    }

    /// Dimension n.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vertices, n!.
    pub fn vertex_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Edges per vertex, n - 1.
    pub fn degree(&self) -> usize {
        self.dimension - 1
    }

    /// Total directed edges, n! * (n - 1).
    pub fn edge_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Neighbours of `vertex` in swap-position order.
    ///
    /// # Panics
    ///
    /// Panics if `vertex >= vertex_count()`.
    pub fn neighbors(&self, vertex: usize) -> &[u32] {
        &self.adjacency[self.offsets[vertex]..self.offsets[vertex + 1]]
    }

    /// Whether `a` and `b` are joined by an edge. Out-of-range ids are never
    /// neighbours.
    pub fn is_neighbor(&self, a: usize, b: usize) -> bool {
        a < self.vertex_count() && self.neighbors(a).iter().any(|&n| n as usize == b)
    }

    /// CSR offsets, length n! + 1.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// CSR neighbour array, length n! * (n - 1).
    pub fn adjacency(&self) -> &[u32] {
        &self.adjacency
    }

    /// Permutation of a vertex id.
    pub fn permutation(&self, vertex: usize) -> Result<Permutation, IstError> {
        Permutation::unrank(vertex as u64, self.dimension)
    }

    /// Vertex id of a permutation of this network's dimension.
    pub fn vertex_of(&self, permutation: &Permutation) -> Result<usize, IstError> {
        if permutation.len() != self.dimension {
            return Err(IstError::InvalidPermutation(format!(
                "permutation of length {} in B_{}",
                permutation.len(),
                self.dimension
            )));
        }
        Ok(permutation.rank() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_b3_layout() {
        let network = BubbleSortNetwork::build(3).unwrap();
        assert_eq!(network.vertex_count(), 6);
        assert_eq!(network.degree(), 2);
        assert_eq!(network.offsets(), &[0, 2, 4, 6, 8, 10, 12]);
        // 123 -> 213 (rank 2), 132 (rank 1)
        assert_eq!(network.neighbors(ROOT), &[2, 1]);
    }

    #[test]
    fn test_rejects_large_dimension() {
        assert!(matches!(
            BubbleSortNetwork::build(13),
            Err(IstError::InvalidDimension { dimension: 13, .. })
        ));
        assert!(BubbleSortNetwork::build(0).is_err());
    }

    #[test]
    fn test_single_vertex_network() {
        let network = BubbleSortNetwork::build(1).unwrap();
        assert_eq!(network.vertex_count(), 1);
        assert_eq!(network.edge_count(), 0);
        assert!(network.neighbors(ROOT).is_empty());
    }

    #[test]
    fn test_is_neighbor_bounds() {
        let network = BubbleSortNetwork::build(4).unwrap();
        assert!(network.is_neighbor(0, 1));
        assert!(!network.is_neighbor(0, 0));
        assert!(!network.is_neighbor(24, 0));
        assert!(!network.is_neighbor(0, u32::MAX as usize));
    }
}
