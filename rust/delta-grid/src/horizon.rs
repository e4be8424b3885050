//! Horizon estimation: how far the pair enumeration must reach so that every
//! column up to `k_max` is fully populated.

use num_integer::Integer;

use crate::error::ConfigError;

/// Columns 1..=3 are pure quadratics; analysis starts here.
pub const FIRST_QUALIFYING_COLUMN: usize = 4;

/// OEIS A080827: ceil((n^2 + 1) / 2). `None` when n^2 + 1 overflows.
pub fn a080827(n: u64) -> Option<u64> {
    let square = n.checked_mul(n)?.checked_add(1)?;
    Some(Integer::div_ceil(&square, &2))
}

/// Minimum pair-index horizon covering every column `k <= k_max`:
/// max over k in [4, k_max] of 2 * A080827(k). The bound grows with k, so
/// the last column decides it.
pub fn horizon_for(k_max: usize) -> Result<u64, ConfigError> {
    if k_max < FIRST_QUALIFYING_COLUMN {
        return Err(ConfigError::KMaxTooSmall(k_max));
    }
    u64::try_from(k_max)
        .ok()
        .and_then(a080827)
        .and_then(|a| a.checked_mul(2))
        .ok_or(ConfigError::KMaxTooLarge(k_max))
}

/// Smallest horizon that populates column 4, the first qualifying column.
pub const fn minimum_horizon() -> u64 {
    let k = FIRST_QUALIFYING_COLUMN as u64;
    (k * k + 2) / 2 * 2
}
