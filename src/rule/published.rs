//! Case table as published
//!
//! Forests built from it are valid for n <= 4 only; from n = 5 some trees
//! contain parent cycles.

use crate::permutation::Permutation;

/// Published case split on the last two symbols `j = v[n]`, `k = v[n - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    /// Case A: `j == n`. `bubble` is the rightmost misplaced position, whose
    /// symbol sits to its left. `detour` is set when moving 2 right would
    /// land on the identity.
    Anchored { second_last: u8, bubble: u8, detour: bool },
    /// Case B with `k == n` and `Swap(n)` not reaching the identity.
    Shifted,
    /// Case B otherwise.
    Trailing,
    /// Case C: `j <= n - 2`.
    Free { last: u8 },
}

pub(crate) fn classify(vertex: &Permutation) -> Case {
    let symbols = vertex.symbols();
    let n = symbols.len() as u8;
    let last = symbols[symbols.len() - 1];
    let second_last = symbols[symbols.len() - 2];

    if last == n {
        let detour = vertex
            .swap_right(2)
            .map(|moved| moved.is_identity())
            .unwrap_or(false);
        Case::Anchored {
            second_last,
            bubble: vertex.rightmost_misplaced() as u8,
            detour,
        }
    } else if last == n - 1 {
        let reaches_root = vertex
            .swap_right(n)
            .map(|moved| moved.is_identity())
            .unwrap_or(false);
        if second_last == n && !reaches_root {
            Case::Shifted
        } else {
            Case::Trailing
        }
    } else {
        Case::Free { last }
    }
}

pub(crate) fn symbol_to_move(vertex: &Permutation, tree: u8) -> u8 {
    let n = vertex.len() as u8;
    match classify(vertex) {
        Case::Anchored { second_last, .. } if tree == n - 1 => second_last,
        Case::Anchored { detour: true, .. } if tree == 2 => tree - 1,
        Case::Anchored {
            second_last,
            bubble,
            ..
        } if second_last == tree || second_last == n - 1 => bubble,
        Case::Anchored { .. } => tree,
        Case::Shifted if tree == 1 => n,
        Case::Shifted => tree - 1,
        Case::Trailing if tree == n - 1 => n,
        Case::Trailing => tree,
        Case::Free { last } if last == tree => n,
        Case::Free { .. } => tree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(symbols: &[u8]) -> Permutation {
        Permutation::from_symbols(symbols.to_vec()).unwrap()
    }

    #[test]
    fn test_case_split() {
        assert!(matches!(classify(&perm(&[4, 2, 3, 1])), Case::Free { last: 1 }));
        assert_eq!(classify(&perm(&[2, 1, 4, 3])), Case::Shifted);
        assert_eq!(classify(&perm(&[1, 2, 4, 3])), Case::Trailing);
        assert_eq!(classify(&perm(&[2, 4, 1, 3])), Case::Trailing);
        assert_eq!(
            classify(&perm(&[2, 1, 3, 4])),
            Case::Anchored {
                second_last: 3,
                bubble: 2,
                detour: true
            }
        );
    }

    #[test]
    fn test_detour_moves_one() {
        // 2134 in tree 2: moving 2 would reach the root, so 1 moves instead.
        assert_eq!(symbol_to_move(&perm(&[2, 1, 3, 4]), 2), 1);
        // Tree 1 bubbles the misplaced 2 home.
        assert_eq!(symbol_to_move(&perm(&[2, 1, 3, 4]), 1), 2);
    }

    #[test]
    fn test_shifted_uses_previous_tree_symbol() {
        let v = perm(&[2, 1, 4, 3]);
        assert_eq!(symbol_to_move(&v, 1), 4);
        assert_eq!(symbol_to_move(&v, 2), 1);
        assert_eq!(symbol_to_move(&v, 3), 2);
    }
}
