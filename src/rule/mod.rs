//! Parent selection for the independent spanning trees
//!
//! Every rule maps a non-root vertex `v` of B_n and a tree index
//! `t in 1..n` to the symbol that moves one step right; the resulting
//! permutation is `v`'s parent in tree `t`. Both rules classify the vertex
//! first and then resolve the move from a decision table over
//! `(class, t)`.

mod published;
mod recursive;

use crate::permutation::Permutation;
use crate::IstError;

/// Which decision table picks the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParentRule {
    /// Table applied inside the active window of the vertex. Produces valid,
    /// independent trees for every dimension.
    #[default]
    Recursive,
    /// Case table exactly as published. Agrees with [`ParentRule::Recursive`]
    /// up to n = 4 and creates parent cycles from n = 5 onwards.
    Published,
}

impl ParentRule {
    /// Parent of `vertex` in tree `tree`.
    ///
    /// The result is always one adjacent transposition away from `vertex`.
    pub fn compute_parent(self, vertex: &Permutation, tree: usize) -> Result<Permutation, IstError> {
        let symbol = self.symbol_to_move(vertex, tree)?;
        vertex.swap_right(symbol)
    }

    /// Symbol that moves one position right to reach the parent.
    pub fn symbol_to_move(self, vertex: &Permutation, tree: usize) -> Result<u8, IstError> {
        let dimension = vertex.len();
        if dimension < 2 {
            return Err(IstError::InvalidDimension {
                dimension,
                min: 2,
                max: crate::util::MAX_CODEC_DIMENSION,
            });
        }
        if tree == 0 || tree >= dimension {
            return Err(IstError::InvalidTreeIndex {
                tree,
                max: dimension - 1,
            });
        }
        if vertex.is_identity() {
            return Err(IstError::RootHasNoParent);
        }

        Ok(match self {
            ParentRule::Recursive => recursive::symbol_to_move(vertex.symbols(), tree as u8),
            ParentRule::Published => published::symbol_to_move(vertex, tree as u8),
        })
    }

    /// Short lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ParentRule::Recursive => "recursive",
            ParentRule::Published => "published",
        }
    }
}

/// Parent of `vertex` in tree `tree` under the default rule.
pub fn compute_parent(vertex: &Permutation, tree: usize) -> Result<Permutation, IstError> {
    ParentRule::default().compute_parent(vertex, tree)
}
