//! Structural checks over a finished forest
//!
//! Validation walks every vertex to the root with a per-trace visited marker;
//! independence compares the root paths of every pair of trees from every
//! vertex. Both stop at the first violation and never modify the forest.

use bitvec::prelude::*;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::construct::{Forest, SpanningTree, NO_PARENT};
use crate::network::{BubbleSortNetwork, ROOT};

/// First structural defect found in a tree or forest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Parent array length differs from the vertex count
    #[error("Tree {tree} has {actual} parent entries, expected {expected}")]
    SizeMismatch {
        /// Tree index
        tree: usize,
        /// Entries present
        actual: usize,
        /// Vertices in the network
        expected: usize,
    },

    /// Root carries a parent
    #[error("Root of tree {tree} has parent {parent}")]
    RootHasParent {
        /// Tree index
        tree: usize,
        /// Parent stored at the root
        parent: u32,
    },

    /// Parent pointer outside the vertex range
    #[error("Invalid parent for vertex {vertex}: {parent} (tree {tree})")]
    InvalidParent {
        /// Tree index
        tree: usize,
        /// Offending vertex
        vertex: usize,
        /// Stored parent
        parent: u32,
    },

    /// Parent pointer that is not a network edge
    #[error("Parent of vertex {vertex} is not a neighbor (tree {tree}, parent {parent})")]
    NotNeighbor {
        /// Tree index
        tree: usize,
        /// Offending vertex
        vertex: usize,
        /// Stored parent
        parent: u32,
    },

    /// Walk from a vertex revisits a vertex before reaching the root
    #[error("Cycle detected at vertex {vertex} (tree {tree})")]
    Cycle {
        /// Tree index
        tree: usize,
        /// Start of the walk
        vertex: usize,
    },

    /// Forest does not hold n - 1 trees
    #[error("Forest has {actual} trees, expected {expected}")]
    TreeCount {
        /// Trees present
        actual: usize,
        /// n - 1
        expected: usize,
    },

    /// Two root paths from the same vertex meet before the root
    #[error("Trees {first} and {second} share vertex {shared} in paths from {vertex} to root")]
    SharedVertex {
        /// Lower tree index
        first: usize,
        /// Higher tree index
        second: usize,
        /// Common start vertex
        vertex: usize,
        /// Vertex on both paths
        shared: usize,
    },
}

/// Check that `tree` spans the network and is rooted at the identity.
#[instrument(level = "debug", skip_all, fields(tree = tree.index()))]
pub fn validate(tree: &SpanningTree, network: &BubbleSortNetwork) -> Result<(), Violation> {
    let vertex_count = network.vertex_count();
    let parents = tree.parents();
    let index = tree.index();

    if parents.len() != vertex_count {
        return Err(Violation::SizeMismatch {
            tree: index,
            actual: parents.len(),
            expected: vertex_count,
        });
    }
    if parents[ROOT] != NO_PARENT {
        return Err(Violation::RootHasParent {
            tree: index,
            parent: parents[ROOT],
        });
    }

    for (vertex, &parent) in parents.iter().enumerate().skip(1) {
        if parent as usize >= vertex_count {
            return Err(Violation::InvalidParent {
                tree: index,
                vertex,
                parent,
            });
        }
        if !network.is_neighbor(vertex, parent as usize) {
            return Err(Violation::NotNeighbor {
                tree: index,
                vertex,
                parent,
            });
        }
    }

    // Every pointer is now an in-range edge, so walks only need cycle checks.
    let mut visited = bitvec![0; vertex_count];
    let mut trail = Vec::new();
    for vertex in 1..vertex_count {
        let mut current = vertex;
        while current != ROOT {
            if visited[current] {
                return Err(Violation::Cycle {
                    tree: index,
                    vertex,
                });
            }
            visited.set(current, true);
            trail.push(current);
            current = parents[current] as usize;
        }
        for marked in trail.drain(..) {
            visited.set(marked, false);
        }
    }

    Ok(())
}

/// Check that root paths of every pair of trees are internally disjoint.
///
/// Trees are expected to have passed [`validate`]; a walk that fails to reach
/// the root is still reported as a [`Violation::Cycle`] rather than looping.
#[instrument(level = "debug", skip_all, fields(trees = forest.tree_count()))]
pub fn check_independence(forest: &Forest, network: &BubbleSortNetwork) -> Result<(), Violation> {
    let vertex_count = network.vertex_count();
    let expected = network.degree();
    if forest.tree_count() != expected {
        return Err(Violation::TreeCount {
            actual: forest.tree_count(),
            expected,
        });
    }

    let trees = forest.trees();
    let mut on_first_path = bitvec![0; vertex_count];
    let mut first_path = Vec::new();

    for (a, first) in trees.iter().enumerate() {
        for second in &trees[a + 1..] {
            for vertex in 1..vertex_count {
                let marked = walk_interior(first, vertex, vertex_count, |step| {
                    on_first_path.set(step, true);
                    first_path.push(step);
                    true
                });

                let outcome = match marked {
                    Err(_) => Err(Violation::Cycle {
                        tree: first.index(),
                        vertex,
                    }),
                    Ok(()) => walk_interior(second, vertex, vertex_count, |step| {
                        !on_first_path[step]
                    })
                    .map_err(|walk| match walk {
                        Walk::Stopped(shared) => Violation::SharedVertex {
                            first: first.index(),
                            second: second.index(),
                            vertex,
                            shared,
                        },
                        Walk::Lost => Violation::Cycle {
                            tree: second.index(),
                            vertex,
                        },
                    }),
                };

                for step in first_path.drain(..) {
                    on_first_path.set(step, false);
                }
                outcome?;
            }
        }
    }

    Ok(())
}

/// Validate every tree, then check independence.
#[instrument(level = "debug", skip_all, fields(dimension = network.dimension()))]
pub fn verify_forest(forest: &Forest, network: &BubbleSortNetwork) -> Result<(), Violation> {
    let outcome = forest
        .trees()
        .iter()
        .try_for_each(|tree| validate(tree, network))
        .and_then(|()| check_independence(forest, network));

    match &outcome {
        Ok(()) => info!(trees = forest.tree_count(), "forest is valid and independent"),
        Err(violation) => warn!(%violation, "forest failed verification"),
    }
    outcome
}

enum Walk {
    /// `visit` refused this vertex.
    Stopped(usize),
    /// No root within `vertex_count` steps, or a pointer left the tree.
    Lost,
}

/// Visit the vertices strictly between `vertex` and the root.
fn walk_interior(
    tree: &SpanningTree,
    vertex: usize,
    vertex_count: usize,
    mut visit: impl FnMut(usize) -> bool,
) -> Result<(), Walk> {
    let mut current = tree.parent(vertex).ok_or(Walk::Lost)?;
    let mut steps = 0;
    while current != ROOT {
        if current >= vertex_count || steps >= vertex_count {
            return Err(Walk::Lost);
        }
        if !visit(current) {
            return Err(Walk::Stopped(current));
        }
        current = tree.parent(current).ok_or(Walk::Lost)?;
        steps += 1;
    }
    Ok(())
}
