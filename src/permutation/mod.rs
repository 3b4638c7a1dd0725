//! Permutations of `1..=n` and their factorial-number-system ranks
//!
//! A permutation's rank is its position in lexicographic order, so the
//! identity always ranks 0 and becomes the root of every spanning tree.

use std::fmt;
use std::str::FromStr;

use bitvec::prelude::*;

use crate::util::{factorial, factorial_unchecked, MAX_CODEC_DIMENSION};
use crate::IstError;

/// Ordered arrangement of the symbols `1..=n`, each appearing once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permutation {
    symbols: Vec<u8>,
}

impl Permutation {
    /// The identity permutation `1 2 .. n`.
    pub fn identity(dimension: usize) -> Result<Self, IstError> {
        check_dimension(dimension)?;
        Ok(Self {
            symbols: (1..=dimension as u8).collect(),
        })
    }

    /// Build a permutation from explicit symbols, rejecting repeats and
    /// values outside `1..=n`.
    pub fn from_symbols(symbols: Vec<u8>) -> Result<Self, IstError> {
        let dimension = symbols.len();
        check_dimension(dimension)?;

        let mut seen = bitvec![0; dimension + 1];
        for &symbol in &symbols {
            let value = symbol as usize;
            if value == 0 || value > dimension {
                return Err(IstError::InvalidPermutation(format!(
                    "symbol {} outside 1..={}",
                    symbol, dimension
                )));
            }
            if seen[value] {
                return Err(IstError::InvalidPermutation(format!(
                    "symbol {} appears more than once",
                    symbol
                )));
            }
            seen.set(value, true);
        }

        Ok(Self { symbols })
    }

    /// Decode the permutation with the given lexicographic rank.
    ///
    /// Each digit of the index in the factorial number system picks, without
    /// replacement, one of the symbols still available.
    pub fn unrank(index: u64, dimension: usize) -> Result<Self, IstError> {
        check_dimension(dimension)?;
        let limit = factorial(dimension)?;
        if index >= limit {
            return Err(IstError::IndexOutOfRange { index, limit });
        }

        let mut available: Vec<u8> = (1..=dimension as u8).collect();
        let mut symbols = Vec::with_capacity(dimension);
        let mut remainder = index;
        for position in 0..dimension {
            let place = factorial_unchecked(dimension - position - 1);
            let digit = (remainder / place) as usize;
            remainder %= place;
            symbols.push(available.remove(digit));
        }

        Ok(Self { symbols })
    }

    /// Lexicographic rank in `[0, n!)`.
    pub fn rank(&self) -> u64 {
        let n = self.symbols.len();
        let mut index = 0;
        for (position, &symbol) in self.symbols.iter().enumerate() {
            let smaller_to_right = self.symbols[position + 1..]
                .iter()
                .filter(|&&other| other < symbol)
                .count() as u64;
            index += smaller_to_right * factorial_unchecked(n - position - 1);
        }
        index
    }

    /// Number of symbols n.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed permutation; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in position order.
    #[inline]
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Symbol at a 1-indexed position.
    pub fn at(&self, position: usize) -> Option<u8> {
        position
            .checked_sub(1)
            .and_then(|index| self.symbols.get(index).copied())
    }

    /// Whether every symbol sits at its own position.
    pub fn is_identity(&self) -> bool {
        rightmost_misplaced(&self.symbols) == 0
    }

    /// 1-indexed position of `value`, if present.
    pub fn find_position(&self, value: u8) -> Option<usize> {
        self.symbols
            .iter()
            .position(|&symbol| symbol == value)
            .map(|index| index + 1)
    }

    /// Largest 1-indexed position `i` with `p[i] != i`, or 0 for the identity.
    pub fn rightmost_misplaced(&self) -> usize {
        rightmost_misplaced(&self.symbols)
    }

    /// Copy with `value` exchanged with its right neighbour.
    ///
    /// This is the `Swap(value)` primitive of the parent rules.
    pub fn swap_right(&self, value: u8) -> Result<Self, IstError> {
        let position = self.find_position(value).ok_or(IstError::InvalidSwap {
            symbol: value,
            reason: "symbol not present",
        })?;
        if position == self.len() {
            return Err(IstError::InvalidSwap {
                symbol: value,
                reason: "symbol already in the last position",
            });
        }
        self.with_adjacent_swap(position - 1)
    }

    /// Copy with the 0-indexed positions `position` and `position + 1` exchanged.
    pub fn with_adjacent_swap(&self, position: usize) -> Result<Self, IstError> {
        if position + 1 >= self.len() {
            return Err(IstError::InvalidSwap {
                symbol: self.symbols.get(position).copied().unwrap_or(0),
                reason: "no right neighbour",
            });
        }
        let mut symbols = self.symbols.clone();
        symbols.swap(position, position + 1);
        Ok(Self { symbols })
    }

    /// Digits without separators, e.g. `4231`.
    pub fn compact(&self) -> String {
        self.symbols.iter().map(|symbol| symbol.to_string()).collect()
    }
}

/// Largest 1-indexed position holding the wrong symbol, or 0 when sorted.
pub(crate) fn rightmost_misplaced(symbols: &[u8]) -> usize {
    symbols
        .iter()
        .enumerate()
        .rev()
        .find(|&(index, &symbol)| symbol as usize != index + 1)
        .map_or(0, |(index, _)| index + 1)
}

fn check_dimension(dimension: usize) -> Result<(), IstError> {
    if (1..=MAX_CODEC_DIMENSION).contains(&dimension) {
        Ok(())
    } else {
        Err(IstError::InvalidDimension {
            dimension,
            min: 1,
            max: MAX_CODEC_DIMENSION,
        })
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, symbol) in self.symbols.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", symbol)?;
        }
        write!(f, ")")
    }
}

impl FromStr for Permutation {
    type Err = IstError;

    /// Accepts `4231`, `4 2 3 1`, `4,2,3,1` or `(4 2 3 1)`. The compact form
    /// is only unambiguous for single-digit symbols.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim().trim_start_matches('(').trim_end_matches(')');
        let has_separators = trimmed.contains(|c: char| c == ',' || c.is_whitespace());

        let symbols = if has_separators {
            trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(|token| {
                    token.parse::<u8>().map_err(|_| {
                        IstError::InvalidPermutation(format!("'{}' is not a symbol", token))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            trimmed
                .chars()
                .map(|c| {
                    c.to_digit(10).map(|digit| digit as u8).ok_or_else(|| {
                        IstError::InvalidPermutation(format!("'{}' is not a symbol", c))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Self::from_symbols(symbols)
    }
}
