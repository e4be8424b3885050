//! Delta-grid generation: enumerate pairs `0 <= a < b` under a horizon,
//! project each pair to `(x, y)` and keep the maximum `y` seen per `x`.
//!
//! The projection is pluggable; the analysis pipeline uses
//! [`DifferenceOfSquares`] (x = b² − a², y = b − a). Storage is a dense
//! `Vec<u32>` indexed by `x`, sized up front from the horizon so no pair can
//! land outside it.

use std::ops::Range;

use num_integer::Roots;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest array the grid will allocate (64 GiB of `u32` slots).
pub const MAX_SLOTS: u64 = 1 << 34;

/// Maps a pair `(a, b)` with `a < b` to a difference value `x` and a gap `y`.
///
/// Returning `None` drops the pair. A gap of 0 is treated as "no pair".
pub trait Projection: Sync {
    fn project(&self, a: u64, b: u64) -> Option<(u64, u32)>;

    /// Narrow `candidates` to the `b` whose projection may land in `window`.
    /// The default keeps every candidate; pairs outside the window are
    /// dropped after projecting.
    fn b_window(&self, _a: u64, candidates: Range<u64>, _window: Range<u64>) -> Range<u64> {
        candidates
    }
}

/// x = b² − a², y = b − a.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferenceOfSquares;

impl Projection for DifferenceOfSquares {
    fn project(&self, a: u64, b: u64) -> Option<(u64, u32)> {
        let x = b.checked_mul(b)? - a * a;
        let y = u32::try_from(b - a).ok()?;
        Some((x, y))
    }

    /// lo <= b² − a² < hi  ⇔  ceil√(lo + a²) <= b < ceil√(hi + a²).
    fn b_window(&self, a: u64, candidates: Range<u64>, window: Range<u64>) -> Range<u64> {
        let Some(a2) = a.checked_mul(a) else {
            return candidates.start..candidates.start;
        };
        let lo = ceil_sqrt(window.start.saturating_add(a2));
        let hi = ceil_sqrt(window.end.saturating_add(a2));
        candidates.start.max(lo)..candidates.end.min(hi)
    }
}

fn ceil_sqrt(n: u64) -> u64 {
    let root = Roots::sqrt(&n);
    if root * root < n {
        root + 1
    } else {
        root
    }
}

/// Pair-space bounds for a given horizon `n_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridBounds {
    /// a in [0, n_end/2), b in [a+1, (n_end−a+1)/2). Capacity (n_end/2)² + 1.
    #[default]
    Compact,
    /// a in [0, n_end), b in [a+1, n_end−a]. Capacity n_end² + 1.
    Full,
}

impl GridBounds {
    /// Number of `x` slots the array needs for this horizon, or `None` when
    /// that exceeds [`MAX_SLOTS`] or the address space.
    pub fn capacity(self, horizon: u64) -> Option<usize> {
        let side = match self {
            GridBounds::Compact => horizon / 2,
            GridBounds::Full => horizon,
        };
        let slots = side.checked_mul(side)?.checked_add(1)?;
        if slots > MAX_SLOTS {
            return None;
        }
        usize::try_from(slots).ok()
    }

    /// Range of the smaller pair element `a`.
    pub fn outer(self, horizon: u64) -> Range<u64> {
        match self {
            GridBounds::Compact => 0..horizon / 2,
            GridBounds::Full => 0..horizon,
        }
    }

    /// Range of the larger pair element `b` for a given `a`. May be empty.
    pub fn inner(self, horizon: u64, a: u64) -> Range<u64> {
        match self {
            GridBounds::Compact => a + 1..(horizon - a).saturating_add(1) / 2,
            GridBounds::Full => a + 1..(horizon - a).saturating_add(1),
        }
    }
}

impl std::fmt::Display for GridBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridBounds::Compact => write!(f, "compact"),
            GridBounds::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for GridBounds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(GridBounds::Compact),
            "full" => Ok(GridBounds::Full),
            other => Err(format!("unknown grid bounds '{other}' (expected compact|full)")),
        }
    }
}

/// Max-gap value per difference `x`, frozen once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxDeltaArray {
    horizon: u64,
    bounds: GridBounds,
    gaps: Vec<u32>,
}

impl MaxDeltaArray {
    /// Sequential single-pass build.
    ///
    /// A horizon whose capacity is out of range yields an empty array;
    /// validated configurations never get here with one.
    pub fn build<P: Projection>(horizon: u64, bounds: GridBounds, projection: &P) -> Self {
        let Some(capacity) = bounds.capacity(horizon) else {
            return Self::unrepresentable(horizon, bounds);
        };
        let mut gaps = vec![0u32; capacity];
        accumulate(&mut gaps, 0, horizon, bounds, projection);
        log::debug!(
            "Built {} grid: horizon={}, capacity={}",
            bounds,
            horizon,
            gaps.len()
        );
        Self {
            horizon,
            bounds,
            gaps,
        }
    }

    /// Data-parallel build over disjoint `x` windows.
    ///
    /// The array is allocated once and split into chunks; each rayon task
    /// owns one chunk and enumerates only the pairs the projection maps into
    /// it. Identical to [`MaxDeltaArray::build`].
    pub fn build_parallel<P: Projection>(horizon: u64, bounds: GridBounds, projection: &P) -> Self {
        let Some(capacity) = bounds.capacity(horizon) else {
            return Self::unrepresentable(horizon, bounds);
        };
        // A few chunks per worker so uneven windows still balance.
        let chunks = rayon::current_num_threads().max(1) * 4;
        let chunk_len = capacity.div_ceil(chunks).max(1);

        let mut gaps = vec![0u32; capacity];
        gaps.par_chunks_mut(chunk_len)
            .enumerate()
            .for_each(|(i, window)| {
                let offset = (i * chunk_len) as u64;
                accumulate(window, offset, horizon, bounds, projection);
            });

        log::debug!(
            "Built {} grid in {} chunks: horizon={}, capacity={}",
            bounds,
            capacity.div_ceil(chunk_len),
            horizon,
            gaps.len()
        );
        Self {
            horizon,
            bounds,
            gaps,
        }
    }

    fn unrepresentable(horizon: u64, bounds: GridBounds) -> Self {
        log::warn!("Horizon {} is too large for {} bounds; grid left empty", horizon, bounds);
        Self {
            horizon,
            bounds,
            gaps: Vec::new(),
        }
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Number of `x` slots (largest representable `x` is `len() - 1`).
    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Max gap for `x`; 0 means no enumerated pair produced `x`.
    pub fn get(&self, x: u64) -> u32 {
        usize::try_from(x)
            .ok()
            .and_then(|i| self.gaps.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.gaps
    }

    /// `(x, y)` for every reachable `x`, ascending.
    pub fn populated(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.gaps
            .iter()
            .enumerate()
            .filter(|(_, &y)| y > 0)
            .map(|(x, &y)| (x as u64, y))
    }
}

/// Fill `window`, which holds slots `offset..offset + window.len()`.
/// Monotone update: a candidate replaces the stored gap only if strictly greater.
fn accumulate<P: Projection>(
    window: &mut [u32],
    offset: u64,
    horizon: u64,
    bounds: GridBounds,
    projection: &P,
) {
    let end = offset + window.len() as u64;
    for a in bounds.outer(horizon) {
        for b in projection.b_window(a, bounds.inner(horizon, a), offset..end) {
            let Some((x, y)) = projection.project(a, b) else {
                continue;
            };
            if x < offset || x >= end {
                continue;
            }
            let slot = &mut window[(x - offset) as usize];
            if y > *slot {
                *slot = y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Brute-force reference: every pair in the same bounds, into a map.
    fn brute_force(horizon: u64, bounds: GridBounds) -> HashMap<u64, u32> {
        let mut best = HashMap::new();
        for a in bounds.outer(horizon) {
            for b in bounds.inner(horizon, a) {
                let x = b * b - a * a;
                let y = (b - a) as u32;
                let e = best.entry(x).or_insert(0);
                if y > *e {
                    *e = y;
                }
            }
        }
        best
    }

    #[test]
    fn test_compact_matches_brute_force() {
        for horizon in [18u64, 30, 57, 102] {
            let grid = MaxDeltaArray::build(horizon, GridBounds::Compact, &DifferenceOfSquares);
            let reference = brute_force(horizon, GridBounds::Compact);
            assert_eq!(grid.len() as u64, (horizon / 2) * (horizon / 2) + 1);
            for x in 0..grid.len() as u64 {
                assert_eq!(
                    grid.get(x),
                    reference.get(&x).copied().unwrap_or(0),
                    "horizon={horizon} x={x}"
                );
            }
        }
    }

    #[test]
    fn test_full_matches_brute_force() {
        let horizon = 40;
        let grid = MaxDeltaArray::build(horizon, GridBounds::Full, &DifferenceOfSquares);
        let reference = brute_force(horizon, GridBounds::Full);
        assert_eq!(grid.len(), 1601);
        let populated: HashMap<u64, u32> = grid.populated().collect();
        assert_eq!(populated, reference);
    }

    #[test]
    fn test_known_max_gaps() {
        let grid = MaxDeltaArray::build(102, GridBounds::Compact, &DifferenceOfSquares);
        // 7 = 4² − 3² is the only representation: gap 1.
        assert_eq!(grid.get(7), 1);
        // 15 = 4² − 1² (gap 3) beats 8² − 7² (gap 1).
        assert_eq!(grid.get(15), 3);
        // Numbers ≡ 2 (mod 4) are never a difference of squares.
        for x in (2..grid.len() as u64).step_by(4) {
            assert_eq!(grid.get(x), 0, "x={x}");
        }
        assert_eq!(grid.get(u64::MAX), 0);
    }

    #[test]
    fn test_parallel_is_bitwise_identical() {
        for bounds in [GridBounds::Compact, GridBounds::Full] {
            let serial = MaxDeltaArray::build(120, bounds, &DifferenceOfSquares);
            let parallel = MaxDeltaArray::build_parallel(120, bounds, &DifferenceOfSquares);
            assert_eq!(serial, parallel);
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let first = MaxDeltaArray::build(202, GridBounds::Compact, &DifferenceOfSquares);
        let second = MaxDeltaArray::build(202, GridBounds::Compact, &DifferenceOfSquares);
        assert_eq!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_custom_projection_respects_capacity() {
        /// Sum of squares overflows the difference-of-squares capacity.
        struct SumOfSquares;
        impl Projection for SumOfSquares {
            fn project(&self, a: u64, b: u64) -> Option<(u64, u32)> {
                Some((a * a + b * b, 1))
            }
        }
        let grid = MaxDeltaArray::build(20, GridBounds::Compact, &SumOfSquares);
        assert_eq!(grid.len(), 101);
        assert_eq!(grid.get(1), 1); // 0² + 1²
        assert_eq!(grid.get(3), 0);
        assert!(grid.populated().all(|(x, _)| x <= 100));
    }

    #[test]
    fn test_b_window_is_exact() {
        let p = DifferenceOfSquares;
        for a in 0..20u64 {
            for (lo, hi) in [(0u64, 50u64), (37, 120), (200, 201), (400, 400)] {
                let kept: Vec<u64> = p.b_window(a, a + 1..60, lo..hi).collect();
                let expected: Vec<u64> = (a + 1..60)
                    .filter(|&b| (lo..hi).contains(&(b * b - a * a)))
                    .collect();
                assert_eq!(kept, expected, "a={a} window={lo}..{hi}");
            }
        }
    }

    #[test]
    fn test_parallel_with_default_window() {
        struct HalfGap;
        impl Projection for HalfGap {
            fn project(&self, a: u64, b: u64) -> Option<(u64, u32)> {
                Some((a + b, ((b - a) / 2) as u32))
            }
        }
        let serial = MaxDeltaArray::build(90, GridBounds::Compact, &HalfGap);
        let parallel = MaxDeltaArray::build_parallel(90, GridBounds::Compact, &HalfGap);
        assert_eq!(serial, parallel);
        assert!(serial.populated().count() > 0);
    }

    #[test]
    fn test_capacity_limits() {
        assert_eq!(GridBounds::Compact.capacity(102), Some(2602));
        assert_eq!(GridBounds::Full.capacity(40), Some(1601));
        assert_eq!(GridBounds::Compact.capacity(u64::MAX), None);
        assert_eq!(GridBounds::Full.capacity(10_000_000_002), None);
        // 2^17 squared is exactly MAX_SLOTS; plus one slot is too many.
        assert_eq!(GridBounds::Full.capacity(1 << 17), None);
        assert!(GridBounds::Full.capacity((1 << 17) - 1).is_some());
    }

    #[test]
    fn test_oversized_horizon_builds_empty() {
        let grid = MaxDeltaArray::build_parallel(u64::MAX, GridBounds::Compact, &DifferenceOfSquares);
        assert!(grid.is_empty());
        assert_eq!(grid.get(7), 0);
        assert_eq!(DifferenceOfSquares.project(0, u64::MAX), None);
    }

    #[test]
    fn test_grid_bounds_parse() {
        assert_eq!("compact".parse::<GridBounds>(), Ok(GridBounds::Compact));
        assert_eq!("full".parse::<GridBounds>(), Ok(GridBounds::Full));
        assert!("dense".parse::<GridBounds>().is_err());
        assert_eq!(GridBounds::Full.to_string(), "full");
    }
}
