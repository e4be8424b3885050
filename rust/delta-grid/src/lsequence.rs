//! Cross-column L-sequences and their strict-decrease split.
//!
//! `L_{n+4}` collects the `n`-th positional irregular value of every column,
//! in increasing column order. Columns whose prefix is too short are skipped,
//! never padded.

use serde::Serialize;

/// Label of the first L-sequence (prefix position 0).
pub const FIRST_LABEL: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LSequence {
    /// `n + 4` for prefix position `n`.
    pub label: usize,
    pub values: Vec<u64>,
}

impl LSequence {
    pub fn name(&self) -> String {
        format!("L{}", self.label)
    }
}

/// Assemble L-sequences from `(k, positional prefix)` pairs.
///
/// Pairs may arrive in any order; columns are visited by increasing `k`.
pub fn assemble<'a, I>(prefixes: I) -> Vec<LSequence>
where
    I: IntoIterator<Item = (usize, &'a [u64])>,
{
    let mut columns: Vec<(usize, &[u64])> = prefixes
        .into_iter()
        .filter(|(_, prefix)| !prefix.is_empty())
        .collect();
    columns.sort_by_key(|&(k, _)| k);

    let max_len = columns.iter().map(|(_, p)| p.len()).max().unwrap_or(0);
    (0..max_len)
        .map(|n| LSequence {
            label: n + FIRST_LABEL,
            values: columns
                .iter()
                .filter_map(|(_, prefix)| prefix.get(n).copied())
                .collect(),
        })
        .collect()
}

/// A sequence cut at its last non-increasing adjacent pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub left: Vec<u64>,
    /// Maximal strictly increasing suffix.
    pub right: Vec<u64>,
}

/// Index where the strictly increasing suffix starts: the last `i` with
/// `seq[i-1] >= seq[i]`, or 0 when the whole sequence strictly increases.
pub fn decrease_point(seq: &[u64]) -> usize {
    (1..seq.len())
        .rev()
        .find(|&i| seq[i - 1] >= seq[i])
        .unwrap_or(0)
}

pub fn split_on_strict_decrease(seq: &[u64]) -> Split {
    let (left, right) = seq.split_at(decrease_point(seq));
    Split {
        left: left.to_vec(),
        right: right.to_vec(),
    }
}
