//! Utility functions

use crate::IstError;

/// Largest n whose n! fits in a `u64` index.
pub const MAX_CODEC_DIMENSION: usize = 20;

/// Factorials 0! through 20!.
const FACTORIALS: [u64; MAX_CODEC_DIMENSION + 1] = {
    let mut table = [1u64; MAX_CODEC_DIMENSION + 1];
    let mut i = 1;
    while i <= MAX_CODEC_DIMENSION {
        table[i] = table[i - 1] * i as u64;
        i += 1;
    }
    table
};

/// n! for n in `0..=20`.
pub fn factorial(n: usize) -> Result<u64, IstError> {
    FACTORIALS
        .get(n)
        .copied()
        .ok_or(IstError::InvalidDimension {
            dimension: n,
            min: 0,
            max: MAX_CODEC_DIMENSION,
        })
}

/// Table lookup without a range check; callers have already validated `n`.
#[inline]
pub(crate) fn factorial_unchecked(n: usize) -> u64 {
    FACTORIALS[n]
}

/// Allocate an empty vector with room for `len` items, reporting failure
/// instead of aborting the process.
pub(crate) fn try_with_capacity<T>(len: usize, what: &'static str) -> Result<Vec<T>, IstError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| IstError::OutOfMemory { what, source })?;
    Ok(buffer)
}

/// Allocate a vector of `len` copies of `value`.
pub(crate) fn try_filled<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> Result<Vec<T>, IstError> {
    let mut buffer = try_with_capacity(len, what)?;
    buffer.resize(len, value);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_factorials() {
        assert_eq!(factorial(0).unwrap(), 1);
        assert_eq!(factorial(1).unwrap(), 1);
        assert_eq!(factorial(4).unwrap(), 24);
        assert_eq!(factorial(12).unwrap(), 479_001_600);
    }

    #[test]
    fn test_largest_factorial_fits() {
        assert_eq!(factorial(20).unwrap(), 2_432_902_008_176_640_000);
        assert!(matches!(
            factorial(21),
            Err(IstError::InvalidDimension { dimension: 21, .. })
        ));
    }

    #[test]
    fn test_try_filled() {
        let buffer = try_filled(5, 7u32, "test buffer").unwrap();
        assert_eq!(buffer, vec![7; 5]);
    }
}
