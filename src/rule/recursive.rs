//! Decision table applied inside the active window
//!
//! For tree `t`, trailing symbols that already sit in their final position
//! are dropped while the window's top tree index `m - 1` exceeds `t`. What
//! remains is a vertex of B_m, classified by its last two symbols.

use crate::permutation::rightmost_misplaced;

/// Shape of a vertex within its active window of size `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Window ends with `m`. Only tree `m - 1` stops here; it leaves the
    /// sorted tail by moving the second-to-last symbol.
    Settled { second_last: u8 },
    /// Window ends with `m, m - 1` in front of an unsorted prefix `u`.
    /// `pivot` is the rightmost misplaced position of `u` and `exit` the
    /// symbol sitting there.
    Blocked { top: u8, pivot: u8, exit: u8 },
    /// Window ends with `m - 1` otherwise.
    Pending { top: u8 },
    /// Window ends with a symbol below `m - 1`.
    Open { top: u8, last: u8 },
}

/// Classify `symbols` as seen by `tree`.
pub(crate) fn classify(symbols: &[u8], tree: u8) -> Shape {
    let tree = tree as usize;
    let mut top = symbols.len();
    while symbols[top - 1] as usize == top && tree + 1 < top {
        top -= 1;
    }

    let last = symbols[top - 1];
    let second_last = symbols[top - 2];
    let m = top as u8;

    if last == m {
        return Shape::Settled { second_last };
    }
    if last == m - 1 {
        if second_last == m {
            let prefix = &symbols[..top - 2];
            let pivot = rightmost_misplaced(prefix);
            if pivot > 0 {
                return Shape::Blocked {
                    top: m,
                    pivot: pivot as u8,
                    exit: prefix[pivot - 1],
                };
            }
        }
        return Shape::Pending { top: m };
    }
    Shape::Open { top: m, last }
}

/// Symbol whose right move leads to the parent in `tree`.
pub(crate) fn symbol_to_move(symbols: &[u8], tree: u8) -> u8 {
    match classify(symbols, tree) {
        Shape::Settled { second_last } => second_last,
        Shape::Pending { top } if tree == top - 1 => top,
        Shape::Blocked { top, pivot, .. } if tree == top - 1 => pivot,
        Shape::Blocked { top, exit, .. } if tree == exit => top,
        Shape::Blocked { pivot, exit, .. } if tree == pivot => exit,
        Shape::Open { top, last } if tree == last => top,
        Shape::Pending { .. } | Shape::Blocked { .. } | Shape::Open { .. } => tree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_drops_sorted_tail() {
        // Tree 1 sees 21345 as 21 inside B_2.
        assert_eq!(classify(&[2, 1, 3, 4, 5], 1), Shape::Pending { top: 2 });
        // Tree 2 stops at B_3 where 3 is already last.
        assert_eq!(
            classify(&[2, 1, 3, 4, 5], 2),
            Shape::Settled { second_last: 1 }
        );
        // Tree 4 always sees the whole permutation.
        assert_eq!(classify(&[2, 1, 3, 4, 5], 4), Shape::Settled { second_last: 4 });
    }

    #[test]
    fn test_blocked_prefix() {
        // 2 1 3 | 5 4: prefix 213 has its rightmost misplaced position at 2,
        // holding symbol 1.
        assert_eq!(
            classify(&[2, 1, 3, 5, 4], 1),
            Shape::Blocked {
                top: 5,
                pivot: 2,
                exit: 1
            }
        );
        assert_eq!(symbol_to_move(&[2, 1, 3, 5, 4], 4), 2);
        assert_eq!(symbol_to_move(&[2, 1, 3, 5, 4], 1), 5);
        assert_eq!(symbol_to_move(&[2, 1, 3, 5, 4], 2), 1);
        assert_eq!(symbol_to_move(&[2, 1, 3, 5, 4], 3), 3);
    }

    #[test]
    fn test_sorted_prefix_is_pending() {
        // 1 2 3 5 4 is one swap from the root.
        assert_eq!(classify(&[1, 2, 3, 5, 4], 2), Shape::Pending { top: 5 });
        assert_eq!(symbol_to_move(&[1, 2, 3, 5, 4], 4), 5);
    }

    #[test]
    fn test_open_window() {
        assert_eq!(classify(&[4, 2, 3, 1], 2), Shape::Open { top: 4, last: 1 });
        assert_eq!(symbol_to_move(&[4, 2, 3, 1], 1), 4);
        assert_eq!(symbol_to_move(&[4, 2, 3, 1], 3), 3);
    }
}
