//! The batch pipeline: horizon → grid → columns → stabilization →
//! L-sequences → split → prime chains. Built once from a validated
//! [`RunConfig`]; every stage after construction only reads.

use serde::Serialize;

use crate::columns::ColumnGrid;
use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::grid::{DifferenceOfSquares, GridBounds, MaxDeltaArray};
use crate::lsequence::{assemble, split_on_strict_decrease, LSequence, Split};
use crate::prime_chain::{classify, PrimeChainMatch};
use crate::scan::{scan, ScanEntry};
use crate::stabilization::{analyze, ColumnAnalysis};

/// One L-sequence with its split and the prime-chain verdict on its right half.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LSequenceReport {
    pub label: usize,
    pub values: Vec<u64>,
    pub split: Split,
    pub prime_chain: Option<PrimeChainMatch>,
}

impl LSequenceReport {
    pub fn name(&self) -> String {
        format!("L{}", self.label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub k_max: usize,
    pub horizon: u64,
    pub bounds: GridBounds,
    pub columns: Vec<ColumnAnalysis>,
    pub lsequences: Vec<LSequenceReport>,
}

impl PipelineReport {
    pub fn prime_chains(&self) -> impl Iterator<Item = (&LSequenceReport, &PrimeChainMatch)> + '_ {
        self.lsequences
            .iter()
            .filter_map(|l| l.prime_chain.as_ref().map(|m| (l, m)))
    }
}

pub struct Pipeline {
    config: RunConfig,
    horizon: u64,
    grid: MaxDeltaArray,
    columns: ColumnGrid,
}

impl Pipeline {
    /// Validate the configuration and run the expensive stages (grid, columns).
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let horizon = config.effective_horizon()?;
        log::info!(
            "k_max={}, horizon={}, bounds={}",
            config.k_max,
            horizon,
            config.bounds
        );

        let grid = if config.parallel {
            MaxDeltaArray::build_parallel(horizon, config.bounds, &DifferenceOfSquares)
        } else {
            MaxDeltaArray::build(horizon, config.bounds, &DifferenceOfSquares)
        };
        log::info!("Max-delta array built: {} slots", grid.len());

        let columns = ColumnGrid::from_max_delta(&grid);
        log::info!("{} columns built", columns.depth());

        Ok(Self {
            config,
            horizon,
            grid,
            columns,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    pub fn grid(&self) -> &MaxDeltaArray {
        &self.grid
    }

    pub fn columns(&self) -> &ColumnGrid {
        &self.columns
    }

    /// Stabilization analysis of every qualifying column, by increasing `k`.
    pub fn analyses(&self) -> Vec<ColumnAnalysis> {
        self.columns.qualifying(self.config.k_max).map(analyze).collect()
    }

    pub fn lsequences(&self, analyses: &[ColumnAnalysis]) -> Vec<LSequence> {
        let sequences = assemble(
            analyses
                .iter()
                .map(|a| (a.k, a.irregular_prefix.as_slice())),
        );
        log::info!("{} L-sequences assembled", sequences.len());
        sequences
    }

    pub fn report(&self) -> PipelineReport {
        let columns = self.analyses();
        let lsequences = self
            .lsequences(&columns)
            .into_iter()
            .map(|l| {
                let split = split_on_strict_decrease(&l.values);
                let prime_chain = classify(&split.right);
                if let Some(m) = &prime_chain {
                    log::debug!(
                        "{}: prime chain x{} up to {}",
                        l.name(),
                        m.multiplier,
                        m.terminal_prime
                    );
                }
                LSequenceReport {
                    label: l.label,
                    values: l.values,
                    split,
                    prime_chain,
                }
            })
            .collect();

        PipelineReport {
            k_max: self.config.k_max,
            horizon: self.horizon,
            bounds: self.config.bounds,
            columns,
            lsequences,
        }
    }

    /// The filtered value stream over the max-delta array.
    pub fn scan(&self) -> Vec<ScanEntry> {
        scan(&self.grid, &self.config.scan)
    }
}

/// Run every core stage for `config`.
pub fn run(config: &RunConfig) -> Result<PipelineReport, ConfigError> {
    Ok(Pipeline::new(config.clone())?.report())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(k_max: usize) -> RunConfig {
        RunConfig {
            k_max,
            parallel: false,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_pipeline_k_max_10() {
        let report = run(&config(10)).unwrap();
        assert_eq!(report.horizon, 102);
        let ks: Vec<usize> = report.columns.iter().map(|c| c.k).collect();
        assert_eq!(ks, vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(report.columns[0].irregular_prefix, vec![20]);
        assert_eq!(report.lsequences.len(), 14);
        assert_eq!(report.lsequences[0].values, vec![20, 11, 13, 17, 19, 23]);
    }

    #[test]
    fn test_prime_chains_found() {
        let report = run(&config(10)).unwrap();
        let chains: Vec<(usize, u64, u64, usize)> = report
            .prime_chains()
            .map(|(l, m)| (l.label, m.multiplier, m.terminal_prime, m.length))
            .collect();
        assert_eq!(
            chains,
            vec![(4, 1, 23, 5), (5, 4, 19, 5), (6, 3, 23, 3), (7, 8, 19, 3)]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(run(&config(2)), Err(ConfigError::KMaxTooSmall(2))));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let serial = run(&config(12)).unwrap();
        let parallel = run(&RunConfig {
            parallel: true,
            ..config(12)
        })
        .unwrap();
        assert_eq!(serial.columns, parallel.columns);
        assert_eq!(serial.lsequences, parallel.lsequences);
    }
}
