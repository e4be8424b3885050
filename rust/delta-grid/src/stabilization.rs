//! Per-column stabilization analysis against the closed form
//! x_n = n(n + 2(k−1)).
//!
//! Two views of the anomalies are exposed side by side:
//!
//! - **positional** ([`irregular_prefix`]): every mismatching value before the
//!   start of the column's all-matching tail, in column order. Feeds the
//!   cross-column assembler.
//! - **longest run** ([`longest_run_prefix`]): the longest contiguous matching
//!   run anywhere in the column; mismatches before its start, deduplicated
//!   and sorted. Used for reporting.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::columns::Column;

/// Predicted value at 1-based position `n` of column `k`.
pub fn predicted(k: usize, n: usize) -> u64 {
    let (k, n) = (k as u64, n as u64);
    n * (n + 2 * (k - 1))
}

/// Human-readable predictor for column `k`.
pub fn formula(k: usize) -> String {
    format!("x = n(n + {})", 2 * (k - 1))
}

fn matches_at(column: &Column, i: usize) -> bool {
    column.values[i] == predicted(column.k, i + 1)
}

/// A contiguous run of formula matches, 1-based start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchRun {
    pub start: usize,
    pub length: usize,
}

/// 1-based start of the all-matching tail. `len + 1` when the last entry
/// mismatches; `None` for an empty column.
pub fn stabilization_index(column: &Column) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let tail = (0..column.len())
        .rev()
        .take_while(|&i| matches_at(column, i))
        .count();
    Some(column.len() - tail + 1)
}

/// Positional irregular prefix: mismatches before [`stabilization_index`].
pub fn irregular_prefix(column: &Column) -> Vec<u64> {
    let Some(stable_at) = stabilization_index(column) else {
        return Vec::new();
    };
    (0..stable_at - 1)
        .filter(|&i| !matches_at(column, i))
        .map(|i| column.values[i])
        .collect()
}

/// Longest contiguous matching run; ties keep the first.
pub fn longest_run(column: &Column) -> Option<MatchRun> {
    let mut best: Option<MatchRun> = None;
    let mut current: Option<MatchRun> = None;

    for i in 0..column.len() {
        if matches_at(column, i) {
            let run = current.get_or_insert(MatchRun {
                start: i + 1,
                length: 0,
            });
            run.length += 1;
        } else if let Some(run) = current.take() {
            if best.map_or(true, |b| run.length > b.length) {
                best = Some(run);
            }
        }
    }
    if let Some(run) = current {
        if best.map_or(true, |b| run.length > b.length) {
            best = Some(run);
        }
    }
    best
}

/// Longest-run view: mismatches before the longest run, deduplicated and
/// sorted. With no matching position at all, every mismatch is returned.
pub fn longest_run_prefix(column: &Column) -> (Option<MatchRun>, Vec<u64>) {
    let run = longest_run(column);
    let limit = run.map_or(column.len(), |r| r.start - 1);
    let prefix: BTreeSet<u64> = (0..limit)
        .filter(|&i| !matches_at(column, i))
        .map(|i| column.values[i])
        .collect();
    (run, prefix.into_iter().collect())
}

/// Full analysis of one column, both views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnAnalysis {
    pub k: usize,
    pub formula: String,
    pub length: usize,
    /// Start of the all-matching tail (1-based).
    pub stabilization_index: Option<usize>,
    pub longest_run: Option<MatchRun>,
    /// Mismatches in column order (positional view).
    pub irregular_prefix: Vec<u64>,
    /// Mismatches before the longest run, sorted and unique.
    pub sorted_prefix: Vec<u64>,
}

impl ColumnAnalysis {
    /// Length of the longest run, 0 if nothing matches.
    pub fn run_length(&self) -> usize {
        self.longest_run.map_or(0, |r| r.length)
    }
}

pub fn analyze(column: &Column) -> ColumnAnalysis {
    let (longest, sorted_prefix) = longest_run_prefix(column);
    let analysis = ColumnAnalysis {
        k: column.k,
        formula: formula(column.k),
        length: column.len(),
        stabilization_index: stabilization_index(column),
        longest_run: longest,
        irregular_prefix: irregular_prefix(column),
        sorted_prefix,
    };
    log::debug!(
        "Column {}: stabilizes at {:?}, {} irregular",
        analysis.k,
        analysis.stabilization_index,
        analysis.irregular_prefix.len()
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(k: usize, values: &[u64]) -> Column {
        Column {
            k,
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_predicted_and_formula() {
        assert_eq!(predicted(4, 1), 7);
        assert_eq!(predicted(4, 2), 16);
        assert_eq!(predicted(10, 3), 63);
        assert_eq!(formula(4), "x = n(n + 6)");
        assert_eq!(formula(11), "x = n(n + 20)");
    }

    #[test]
    fn test_column_four_prefix() {
        // Head of column 4 at horizon 102: only position 2 is off (20 != 16).
        let c = column(4, &[7, 20, 27, 40, 55, 72, 91]);
        assert_eq!(stabilization_index(&c), Some(3));
        assert_eq!(irregular_prefix(&c), vec![20]);
        assert_eq!(longest_run(&c), Some(MatchRun { start: 3, length: 5 }));
        assert_eq!(longest_run_prefix(&c).1, vec![20]);
    }

    #[test]
    fn test_positional_prefix_keeps_order_and_duplicates() {
        // k=5: predicted 9, 20, 33, 48, 65
        let c = column(5, &[30, 11, 33, 11, 65]);
        assert_eq!(irregular_prefix(&c), vec![30, 11, 11]);
        assert_eq!(stabilization_index(&c), Some(5));
        // Longest run is the single 33 at position 3 (first of two length-1 runs).
        let (run, sorted) = longest_run_prefix(&c);
        assert_eq!(run, Some(MatchRun { start: 3, length: 1 }));
        assert_eq!(sorted, vec![11, 30]);
    }

    #[test]
    fn test_longest_run_not_at_tail() {
        // k=4: predicted 7, 16, 27, 40, 55, 72
        let c = column(4, &[7, 16, 27, 41, 55, 99]);
        assert_eq!(longest_run(&c), Some(MatchRun { start: 1, length: 3 }));
        assert_eq!(longest_run_prefix(&c).1, Vec::<u64>::new());
        // Tail ends with a mismatch: nothing has stabilized yet.
        assert_eq!(stabilization_index(&c), Some(7));
        assert_eq!(irregular_prefix(&c), vec![41, 99]);
    }

    #[test]
    fn test_no_matches_at_all() {
        let c = column(6, &[3, 2, 1]);
        assert_eq!(longest_run(&c), None);
        assert_eq!(longest_run_prefix(&c), (None, vec![1, 2, 3]));
        assert_eq!(stabilization_index(&c), Some(4));
        assert_eq!(irregular_prefix(&c), vec![3, 2, 1]);
    }

    #[test]
    fn test_perfect_and_empty_columns() {
        let perfect = column(4, &[7, 16, 27, 40]);
        assert_eq!(stabilization_index(&perfect), Some(1));
        assert!(irregular_prefix(&perfect).is_empty());
        let a = analyze(&perfect);
        assert_eq!(a.run_length(), 4);
        assert!(a.sorted_prefix.is_empty());

        let empty = column(9, &[]);
        assert_eq!(stabilization_index(&empty), None);
        assert!(irregular_prefix(&empty).is_empty());
        let a = analyze(&empty);
        assert_eq!(a.longest_run, None);
        assert_eq!(a.run_length(), 0);
    }

    #[test]
    fn test_tail_matches_after_stabilization() {
        let c = column(5, &[11, 28, 33, 56, 65, 84, 105, 128]);
        let start = stabilization_index(&c).unwrap();
        assert_eq!(start, 5);
        for n in start..=c.len() {
            assert_eq!(c.values[n - 1], predicted(5, n));
        }
    }
}
