//! Column building: group the max-delta array by gap value, then read the
//! groups depth-wise so that column `k` holds the `k`-th smallest `x` of every
//! gap group that has one, in ascending gap order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grid::MaxDeltaArray;
use crate::horizon::FIRST_QUALIFYING_COLUMN;

/// One column: the depth-`k` entries across all gap groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// 1-based column index.
    pub k: usize,
    /// Position `i` (0-based) is the `(k-1)`-th smallest `x` of the `i`-th gap group.
    pub values: Vec<u64>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Gap value → ascending `x` list, plus the depth-wise columns, built once.
#[derive(Debug, Clone)]
pub struct ColumnGrid {
    groups: BTreeMap<u32, Vec<u64>>,
    columns: Vec<Column>,
}

impl ColumnGrid {
    /// Group every `x` with a non-zero gap, then transpose into columns.
    pub fn from_max_delta(grid: &MaxDeltaArray) -> Self {
        let mut groups: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
        // populated() is ascending in x, so each group is already sorted.
        for (x, y) in grid.populated() {
            groups.entry(y).or_default().push(x);
        }

        let depth = groups.values().map(Vec::len).max().unwrap_or(0);
        let columns = (0..depth)
            .map(|d| Column {
                k: d + 1,
                values: groups.values().filter_map(|xs| xs.get(d).copied()).collect(),
            })
            .collect();

        Self { groups, columns }
    }

    /// Distinct gap values, ascending.
    pub fn gap_values(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    /// All `x` whose max gap is `gap`, ascending.
    pub fn group(&self, gap: u32) -> Option<&[u64]> {
        self.groups.get(&gap).map(Vec::as_slice)
    }

    /// Number of columns (depth of the largest gap group).
    pub fn depth(&self) -> usize {
        self.columns.len()
    }

    /// Column `k` (1-based), if the horizon reaches that depth.
    pub fn column(&self, k: usize) -> Option<&Column> {
        k.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    /// Columns `4 <= k < k_max`. Columns past the grid's depth are simply absent.
    pub fn qualifying(&self, k_max: usize) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(move |c| c.k >= FIRST_QUALIFYING_COLUMN && c.k < k_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DifferenceOfSquares, GridBounds};

    fn grid_for_k10() -> ColumnGrid {
        let grid = MaxDeltaArray::build(102, GridBounds::Compact, &DifferenceOfSquares);
        ColumnGrid::from_max_delta(&grid)
    }

    #[test]
    fn test_groups_are_sorted_and_disjoint() {
        let cols = grid_for_k10();
        let gaps: Vec<u32> = cols.gap_values().collect();
        assert_eq!(gaps, (1..=50).collect::<Vec<u32>>());
        let mut seen = std::collections::HashSet::new();
        for gap in &gaps {
            let xs = cols.group(*gap).unwrap();
            assert!(xs.windows(2).all(|w| w[0] < w[1]));
            for x in xs {
                assert!(seen.insert(*x), "x={x} in two groups");
            }
        }
        assert!(cols.group(0).is_none());
    }

    #[test]
    fn test_column_four_head() {
        let cols = grid_for_k10();
        let c4 = cols.column(4).unwrap();
        assert_eq!(c4.k, 4);
        assert_eq!(c4.len(), 46);
        assert_eq!(&c4.values[..8], &[7, 20, 27, 40, 55, 72, 91, 112]);
    }

    #[test]
    fn test_column_is_depth_of_each_group() {
        let cols = grid_for_k10();
        for k in 1..=cols.depth() {
            let column = cols.column(k).unwrap();
            let expected: Vec<u64> = cols
                .gap_values()
                .filter_map(|g| cols.group(g).unwrap().get(k - 1).copied())
                .collect();
            assert_eq!(column.values, expected);
        }
        assert_eq!(cols.depth(), 22);
        assert!(cols.column(0).is_none());
        assert!(cols.column(23).is_none());
    }

    #[test]
    fn test_qualifying_excludes_small_and_k_max() {
        let cols = grid_for_k10();
        let ks: Vec<usize> = cols.qualifying(10).map(|c| c.k).collect();
        assert_eq!(ks, vec![4, 5, 6, 7, 8, 9]);
        // Requests past the grid's depth are silently empty.
        let deep: Vec<usize> = cols.qualifying(1000).map(|c| c.k).collect();
        assert_eq!(deep.last(), Some(&22));
    }
}
