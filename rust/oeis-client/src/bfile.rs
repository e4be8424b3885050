//! b-file index tables and offline comparison of computed streams.
//!
//! A b-file is plain text, one `index value` pair per line, with `#` comment
//! lines. Parsing is lenient: anything that is not exactly two integers is
//! skipped.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Serialize;

use crate::OeisError;

/// Value → index and index → value lookups built from a b-file. The first
/// row seen wins in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BFile {
    index_of: HashMap<u64, i64>,
    value_at: HashMap<i64, u64>,
}

impl BFile {
    pub fn value_at(&self, index: i64) -> Option<u64> {
        self.value_at.get(&index).copied()
    }

    pub fn index_of(&self, value: u64) -> Option<i64> {
        self.index_of.get(&value).copied()
    }

    pub fn contains(&self, value: u64) -> bool {
        self.index_of.contains_key(&value)
    }

    pub fn len(&self) -> usize {
        self.index_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_of.is_empty()
    }
}

/// Parse b-file text. Negative values cannot match a computed stream and are
/// skipped along with malformed rows.
pub fn parse_bfile(text: &str) -> BFile {
    let mut index_of = HashMap::new();
    let mut value_at = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(index), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            continue;
        };
        let (Ok(index), Ok(value)) = (index.parse::<i64>(), value.parse::<u64>()) else {
            continue;
        };
        index_of.entry(value).or_insert(index);
        value_at.entry(index).or_insert(value);
    }
    BFile { index_of, value_at }
}

/// Download and parse a b-file. Any transport failure or non-success status
/// is [`OeisError::Unreachable`].
pub fn fetch_bfile(url: &str, timeout: Duration) -> Result<BFile, OeisError> {
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(OeisError::Unreachable(format!("HTTP {} for {}", status, url)));
    }
    let text = response.text()?;
    let bfile = parse_bfile(&text);
    log::info!("Loaded {} b-file entries from {}", bfile.len(), url);
    Ok(bfile)
}

/// One computed value and where (if anywhere) the table has it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEntry {
    /// 1-based position in the computed stream.
    pub position: usize,
    pub value: u64,
    pub database_index: Option<i64>,
}

/// A table row, `a(index) = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub index: i64,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub entries: Vec<ComparisonEntry>,
    /// Computed values before the first one found in the table.
    pub leading_unmatched: usize,
    /// Table index minus stream position at the first match.
    pub index_offset: Option<i64>,
    /// Values after the first match that the table lacks.
    pub differences: Vec<u64>,
    /// Table successors `a(i + 1)` of matched values that the stream never
    /// reports, by ascending index.
    pub missing_successors: Vec<TableEntry>,
}

impl Comparison {
    pub fn any_match(&self) -> bool {
        self.index_offset.is_some()
    }
}

/// Align a computed stream against a table.
pub fn compare(values: &[u64], bfile: &BFile) -> Comparison {
    let mut entries = Vec::with_capacity(values.len());
    let mut leading_unmatched = 0;
    let mut index_offset = None;
    let mut differences = Vec::new();

    for (i, &value) in values.iter().enumerate() {
        let position = i + 1;
        let database_index = bfile.index_of(value);
        match (database_index, index_offset) {
            (Some(idx), None) => index_offset = Some(idx - position as i64),
            (None, None) => leading_unmatched += 1,
            (None, Some(_)) => differences.push(value),
            (Some(_), Some(_)) => {}
        }
        entries.push(ComparisonEntry {
            position,
            value,
            database_index,
        });
    }

    let missing_successors = if index_offset.is_some() {
        missing_successors(values, bfile)
    } else {
        Vec::new()
    };

    Comparison {
        entries,
        leading_unmatched,
        index_offset,
        differences,
        missing_successors,
    }
}

fn missing_successors(values: &[u64], bfile: &BFile) -> Vec<TableEntry> {
    let reported: HashSet<u64> = values.iter().copied().collect();
    let mut indices: Vec<i64> = reported.iter().filter_map(|&v| bfile.index_of(v)).collect();
    indices.sort_unstable();
    indices.dedup();

    indices
        .into_iter()
        .filter_map(|i| {
            let index = i.checked_add(1)?;
            let value = bfile.value_at(index)?;
            (!reported.contains(&value)).then_some(TableEntry { index, value })
        })
        .collect()
}
