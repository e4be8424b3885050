//! delta-grid CLI: column stabilization of max gaps of b² − a².
//!
//! Usage:
//!   delta-grid [--mode=all] [--k-max=40] [--config=<file.json>]
//!
//! Modes:
//!   columns     per-column formula, stabilization point, irregular prefix
//!   lsequences  L4.. split at the last strict decrease (optionally annotated)
//!   chains      L:2 halves that are a multiple of consecutive primes
//!   scan        filtered value stream, compared against a b-file if given
//!   all         columns, lsequences and chains (default)
//!
//! Options:
//!   --config=<path>         JSON run configuration (flags below override it)
//!   --k-max=<N>             Largest column index (default: 40)
//!   --horizon=<N>           Explicit pair-index horizon
//!   --bounds=compact|full   Pair-space bounds (default: compact)
//!   --parallel=true|false   Parallel grid build (default: true)
//!   --n-start=<N> --n-end=<N> --use-gap-values --include-one
//!   --exclude-even --primes-only --stop-at-index=<N>
//!                           Scan filters
//!   --lookup                Annotate L-sequences with database matches
//!   --pause=<secs> --timeout=<secs> --max-terms=<N> --retries=<N>
//!   --bfile-url=<url>       b-file for the scan comparison
//!   --bfile-timeout=<secs>  b-file download timeout (default: 5)
//!   --output=<path>         Also write the L-sequence report here
//!   --json=<path>           Write the full report as JSON

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use delta_grid::config::RunConfig;
use delta_grid::pipeline::{Pipeline, PipelineReport};
use delta_grid::report;
use delta_grid::scan;
use delta_grid::ConfigError;
use oeis_client::{compare, fetch_bfile, OeisClient, SequenceMatch};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);
    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("all");

    if !matches!(mode, "columns" | "lsequences" | "chains" | "scan" | "all") {
        eprintln!("Unknown mode: {mode}. Use --mode=columns|lsequences|chains|scan|all");
        std::process::exit(1);
    }

    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    println!("Delta-grid column stabilization");
    println!("k_max: {}, bounds: {}", config.k_max, config.bounds);

    let start = Instant::now();
    let pipeline = match Pipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Horizon n_end = {} ({} slots, built in {:.2?})\n",
        pipeline.horizon(),
        pipeline.grid().len(),
        start.elapsed()
    );

    if mode == "scan" {
        run_scan(&pipeline);
        return;
    }

    let result = pipeline.report();
    if let Err(e) = print_report(&pipeline, &result, mode, &opts) {
        eprintln!("Failed to write report: {e}");
        std::process::exit(1);
    }

    if let Some(path) = opts.get("json") {
        write_json(&result, path);
    }
}

fn load_config(opts: &HashMap<String, String>) -> Result<RunConfig, ConfigError> {
    let mut config = match opts.get("config") {
        Some(path) => RunConfig::from_json_file(Path::new(path))?,
        None => RunConfig::default(),
    };
    config.apply_args(opts)?;
    config.validate()?;
    Ok(config)
}

fn print_report(
    pipeline: &Pipeline,
    result: &PipelineReport,
    mode: &str,
    opts: &HashMap<String, String>,
) -> io::Result<()> {
    let mut stdout = io::stdout().lock();

    if matches!(mode, "columns" | "all") {
        report::write_column_report(&mut stdout, &result.columns)?;
        println!();
    }

    if matches!(mode, "lsequences" | "all") {
        let matches = lookup_matches(pipeline, result);
        println!("===== L-SEQUENCES =====\n");
        report::write_lsequence_report(&mut stdout, &result.lsequences, &matches)?;
        if let Some(path) = opts.get("output") {
            report::write_to_file(Path::new(path), |w| {
                report::write_lsequence_report(w, &result.lsequences, &matches)
            })?;
            println!(
                "L4 to L{} split saved to '{}'",
                result.lsequences.last().map_or(4, |l| l.label),
                path
            );
        }
    }

    if matches!(mode, "chains" | "all") {
        println!();
        report::write_prime_chain_report(&mut stdout, result)?;
    }
    Ok(())
}

/// Search the database for each non-empty right half, if enabled.
fn lookup_matches(pipeline: &Pipeline, result: &PipelineReport) -> HashMap<usize, SequenceMatch> {
    let mut matches = HashMap::new();
    let settings = &pipeline.config().lookup;
    if !settings.enabled {
        return matches;
    }

    let mut client = match OeisClient::new(settings.client.clone()) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Sequence lookup disabled: {e}");
            return matches;
        }
    };
    for l in &result.lsequences {
        if l.split.right.is_empty() {
            continue;
        }
        if let Some(m) = client.lookup(&l.split.right).into_iter().next() {
            log::info!("{}: {}", l.name(), m);
            matches.insert(l.label, m);
        }
    }
    matches
}

fn run_scan(pipeline: &Pipeline) {
    let config = pipeline.config();
    let entries = pipeline.scan();
    let values = scan::values(&entries);
    println!("Scanned {} value(s)", entries.len());

    let comparison = config.lookup.bfile_url.as_deref().and_then(|url| {
        match fetch_bfile(url, Duration::from_secs(config.lookup.bfile_timeout_secs)) {
            Ok(table) => Some(compare(&values, &table)),
            Err(e) => {
                eprintln!("Warning: {e}");
                eprintln!("Proceeding without OEIS comparison.\n");
                None
            }
        }
    });

    let mut stdout = io::stdout().lock();
    if let Err(e) = report::write_scan_report(
        &mut stdout,
        &entries,
        config.scan.use_gap_values,
        comparison.as_ref(),
    ) {
        eprintln!("Failed to write report: {e}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for arg in args {
        if let Some(kv) = arg.strip_prefix("--") {
            if let Some((k, v)) = kv.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            } else {
                map.insert(kv.to_string(), "true".to_string());
            }
        }
    }
    map
}

fn write_json<T: serde::Serialize>(value: &T, path: &str) {
    match report::write_json(value, Path::new(path)) {
        Ok(()) => println!("\nResults written to {path}"),
        Err(e) => eprintln!("Warning: could not write {path}: {e}"),
    }
}
