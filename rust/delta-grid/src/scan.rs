//! Value-stream scan over a max-delta array: walk `x` ascending inside a
//! range, report either `x` or its max gap, and apply the reporting filters.

use serde::{Deserialize, Serialize};

use crate::arith::is_prime_u64;
use crate::grid::MaxDeltaArray;

/// Reporting filters, read once from the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanFilter {
    /// Inclusive lower bound on `x`.
    pub n_start: u64,
    /// Exclusive upper bound on `x`; `None` scans the whole array.
    pub n_end: Option<u64>,
    /// Report the max gap `y` instead of `x`.
    pub use_gap_values: bool,
    /// Keep `x = 1`, the trivial difference 1² − 0², skipped by default.
    pub include_one: bool,
    pub exclude_even: bool,
    pub primes_only: bool,
    /// Stop once this many values are reported. 0 means no limit.
    pub stop_at_index: usize,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            n_start: 0,
            n_end: None,
            use_gap_values: false,
            include_one: false,
            exclude_even: false,
            primes_only: false,
            stop_at_index: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    /// 1-based index among reported values.
    pub index: usize,
    pub x: u64,
    pub gap: u32,
    /// `x` or `gap`, per [`ScanFilter::use_gap_values`].
    pub value: u64,
}

pub fn scan(grid: &MaxDeltaArray, filter: &ScanFilter) -> Vec<ScanEntry> {
    let mut entries = Vec::new();
    let in_range = |x: u64| x >= filter.n_start && filter.n_end.map_or(true, |end| x < end);
    let admitted = |x: u64| in_range(x) && (filter.include_one || x != 1);

    for (x, gap) in grid.populated().filter(|&(x, _)| admitted(x)) {
        let value = if filter.use_gap_values { gap as u64 } else { x };
        if filter.primes_only && !is_prime_u64(value) {
            continue;
        }
        if filter.exclude_even && value % 2 == 0 {
            continue;
        }
        let index = entries.len() + 1;
        if filter.stop_at_index > 0 && index > filter.stop_at_index {
            log::debug!("Scan stopped at index {}", filter.stop_at_index);
            break;
        }
        entries.push(ScanEntry { index, x, gap, value });
    }
    entries
}

/// The reported values alone, in order.
pub fn values(entries: &[ScanEntry]) -> Vec<u64> {
    entries.iter().map(|e| e.value).collect()
}
