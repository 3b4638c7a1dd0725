//! Text rendering of trees and root paths

use std::fmt;

use crate::construct::SpanningTree;
use crate::network::ROOT;
use crate::permutation::Permutation;

/// Every `child -> parent` edge of one tree, one per line.
#[derive(Debug)]
pub struct TreeListing<'a> {
    tree: &'a SpanningTree,
    dimension: usize,
}

impl<'a> TreeListing<'a> {
    /// List `tree`, whose vertices are permutations of `dimension` symbols.
    pub fn new(tree: &'a SpanningTree, dimension: usize) -> Self {
        Self { tree, dimension }
    }
}

impl fmt::Display for TreeListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree T_{}:", self.tree.index())?;
        for vertex in 0..self.tree.len() {
            if vertex == ROOT {
                continue;
            }
            let child = vertex_label(vertex, self.dimension)?;
            match self.tree.parent(vertex) {
                Some(parent) => {
                    writeln!(f, "  {} -> {}", child, vertex_label(parent, self.dimension)?)?
                }
                None => writeln!(f, "  {} -> (none)", child)?,
            }
        }
        Ok(())
    }
}

/// A vertex sequence joined by arrows, e.g. `(4 2 3 1) -> ... -> (1 2 3 4)`.
#[derive(Debug)]
pub struct PathListing<'a> {
    path: &'a [usize],
    dimension: usize,
}

impl<'a> PathListing<'a> {
    /// Render `path`, whose vertices are permutations of `dimension` symbols.
    pub fn new(path: &'a [usize], dimension: usize) -> Self {
        Self { path, dimension }
    }
}

impl fmt::Display for PathListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (step, &vertex) in self.path.iter().enumerate() {
            if step > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", vertex_label(vertex, self.dimension)?)?;
        }
        Ok(())
    }
}

fn vertex_label(vertex: usize, dimension: usize) -> Result<Permutation, fmt::Error> {
    Permutation::unrank(vertex as u64, dimension).map_err(|_| fmt::Error)
}
