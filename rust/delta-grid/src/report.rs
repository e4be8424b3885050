//! Text and JSON report sinks. Every writer takes any `io::Write`, so the
//! same report goes to the console or to a file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use oeis_client::{Comparison, SequenceMatch};
use serde::Serialize;

use crate::pipeline::{LSequenceReport, PipelineReport};
use crate::scan::ScanEntry;
use crate::stabilization::ColumnAnalysis;

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

pub fn write_column_report<W: Write>(out: &mut W, columns: &[ColumnAnalysis]) -> io::Result<()> {
    writeln!(out, "===== COLUMN SEQUENCES =====")?;
    for c in columns {
        writeln!(out, "\n{}", "-".repeat(50))?;
        writeln!(out, "Column {}", c.k)?;
        writeln!(out, "{}", "-".repeat(50))?;
        writeln!(out, "Formula       : {}", c.formula)?;
        match c.longest_run {
            Some(run) => writeln!(out, "Stabilizes at : n = {}", run.start)?,
            None => writeln!(out, "Stabilizes at : never")?,
        }
        writeln!(out, "Run length    : {}", c.run_length())?;
        if c.sorted_prefix.is_empty() {
            writeln!(out, "No irregular values before stabilization.")?;
        } else {
            writeln!(out, "Irregular prefix:")?;
            writeln!(out, "{:?}", c.sorted_prefix)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// L-sequences
// ---------------------------------------------------------------------------

/// `L<n>:1 [left]`, then `L<n>:2 [right]` when the right half is non-empty,
/// then a blank line. `matches` maps an L label to its database hit.
pub fn write_lsequence_report<W: Write>(
    out: &mut W,
    lsequences: &[LSequenceReport],
    matches: &HashMap<usize, SequenceMatch>,
) -> io::Result<()> {
    for l in lsequences {
        let name = l.name();
        writeln!(out, "{}:1 {:?}", name, l.split.left)?;
        if !l.split.right.is_empty() {
            match matches.get(&l.label) {
                Some(m) => writeln!(out, "{}:2 {:?} -> OEIS match: {}", name, l.split.right, m)?,
                None => writeln!(out, "{}:2 {:?}", name, l.split.right)?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_prime_chain_report<W: Write>(out: &mut W, report: &PipelineReport) -> io::Result<()> {
    writeln!(out, "=== L:2 sequences forming consecutive prime multiples ===\n")?;
    let mut any = false;
    for (l, m) in report.prime_chains() {
        any = true;
        writeln!(
            out,
            "{}: Length={}, k={}, largest prime={}",
            l.name(),
            m.length,
            m.multiplier,
            m.terminal_prime
        )?;
        writeln!(out, "Sequence: {:?}\n", l.split.right)?;
    }
    if !any {
        writeln!(out, "None found.")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Value-stream scan
// ---------------------------------------------------------------------------

/// One row per scan entry, annotated with its table index when a comparison
/// is available, followed by the comparison summary.
pub fn write_scan_report<W: Write>(
    out: &mut W,
    entries: &[ScanEntry],
    use_gap_values: bool,
    comparison: Option<&Comparison>,
) -> io::Result<()> {
    let kind = if use_gap_values { "max_y(x)" } else { "x" };
    writeln!(out, "Reported values ({}):\n", kind)?;
    writeln!(out, "{:>7}|{:>12}| OEIS", "Index", "Element")?;

    for entry in entries {
        let db = comparison
            .and_then(|c| c.entries.get(entry.index - 1))
            .map(|c| c.database_index);
        match db {
            Some(Some(idx)) => writeln!(
                out,
                "[{:6}] {:12} (OEIS: a({}) = {})",
                entry.index, entry.value, idx, entry.value
            )?,
            Some(None) => writeln!(out, "[{:6}] {:12} (Not in OEIS)", entry.index, entry.value)?,
            None => writeln!(out, "[{:6}] {:12}", entry.index, entry.value)?,
        }
    }

    writeln!(out, "\n=== Summary ===")?;
    match comparison {
        Some(c) => write_comparison_summary(out, c),
        None => writeln!(out, "OEIS comparison skipped (offline or unreachable)"),
    }
}

pub fn write_comparison_summary<W: Write>(out: &mut W, comparison: &Comparison) -> io::Result<()> {
    match comparison.index_offset {
        Some(_) if comparison.leading_unmatched > 0 => writeln!(
            out,
            "Initial offset before first OEIS match: {} value(s)",
            comparison.leading_unmatched
        )?,
        Some(_) => writeln!(out, "No initial offset; first computed value is in OEIS")?,
        None => writeln!(out, "No matches found in OEIS data")?,
    }
    if let Some(offset) = comparison.index_offset {
        writeln!(out, "Index offset (OEIS index - position): {}", offset)?;
    }
    if comparison.differences.is_empty() {
        writeln!(
            out,
            "No differences found; all computed values match OEIS sequence after initial offset"
        )?;
    } else {
        writeln!(
            out,
            "Differences found (computed values not in OEIS after alignment): {:?}",
            comparison.differences
        )?;
    }
    if !comparison.missing_successors.is_empty() {
        writeln!(out, "\nOEIS values missing as successors of reported elements:")?;
        for entry in &comparison.missing_successors {
            writeln!(out, "  a({}) = {}", entry.index, entry.value)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()
}

/// Run `write` against a buffered file at `path`.
pub fn write_to_file<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()
}
