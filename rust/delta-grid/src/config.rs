//! Run configuration: one immutable value read at start.
//!
//! Layers, lowest precedence first: [`RunConfig::default`], an optional JSON
//! file, then `--key=value` command-line flags.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use oeis_client::{ClientConfig, MAX_WAIT_SECS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{GridBounds, MAX_SLOTS};
use crate::horizon::{horizon_for, minimum_horizon};
use crate::scan::ScanFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Annotate L-sequences with sequence-database matches.
    pub enabled: bool,
    pub client: ClientConfig,
    /// b-file to compare the scan stream against.
    pub bfile_url: Option<String>,
    pub bfile_timeout_secs: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            client: ClientConfig::default(),
            bfile_url: None,
            bfile_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Largest column index of interest; column `k_max` itself is excluded.
    pub k_max: usize,
    /// Explicit pair-index horizon; derived from `k_max` when absent.
    pub horizon: Option<u64>,
    pub bounds: GridBounds,
    pub parallel: bool,
    pub scan: ScanFilter,
    pub lookup: LookupSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            k_max: 40,
            horizon: None,
            bounds: GridBounds::Compact,
            parallel: true,
            scan: ScanFilter::default(),
            lookup: LookupSettings::default(),
        }
    }
}

impl RunConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `--key=value` flags. Unknown keys are ignored so the binary
    /// can keep its own (`mode`, `json`, `config`).
    pub fn apply_args(&mut self, opts: &HashMap<String, String>) -> Result<(), ConfigError> {
        for (key, value) in opts {
            match key.as_str() {
                "k-max" => self.k_max = parse_value(key, value)?,
                "horizon" => self.horizon = Some(parse_value(key, value)?),
                "bounds" => self.bounds = parse_value(key, value)?,
                "parallel" => self.parallel = parse_value(key, value)?,
                "n-start" => self.scan.n_start = parse_value(key, value)?,
                "n-end" => self.scan.n_end = Some(parse_value(key, value)?),
                "use-gap-values" => self.scan.use_gap_values = parse_value(key, value)?,
                "exclude-even" => self.scan.exclude_even = parse_value(key, value)?,
                "include-one" => self.scan.include_one = parse_value(key, value)?,
                "primes-only" => self.scan.primes_only = parse_value(key, value)?,
                "stop-at-index" => self.scan.stop_at_index = parse_value(key, value)?,
                "lookup" => self.lookup.enabled = parse_value(key, value)?,
                "pause" => self.lookup.client.pause_secs = parse_value(key, value)?,
                "timeout" => self.lookup.client.timeout_secs = parse_value(key, value)?,
                "max-terms" => self.lookup.client.max_terms = parse_value(key, value)?,
                "bfile-timeout" => self.lookup.bfile_timeout_secs = parse_value(key, value)?,
                "retries" => self.lookup.client.retries = parse_value(key, value)?,
                "bfile-url" => self.lookup.bfile_url = Some(value.clone()),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        horizon_for(self.k_max)?;
        if let Some(horizon) = self.horizon {
            let minimum = minimum_horizon();
            if horizon < minimum {
                return Err(ConfigError::HorizonTooSmall { horizon, minimum });
            }
        }
        let horizon = self.effective_horizon()?;
        if self.bounds.capacity(horizon).is_none() {
            return Err(ConfigError::HorizonTooLarge {
                horizon,
                bounds: self.bounds,
                max_slots: MAX_SLOTS,
            });
        }
        if let Some(end) = self.scan.n_end {
            if self.scan.n_start >= end {
                return Err(ConfigError::InvalidRange {
                    start: self.scan.n_start,
                    end,
                });
            }
        }

        let client = &self.lookup.client;
        let max_wait = MAX_WAIT_SECS as f64;
        if !(0.0..=max_wait).contains(&client.pause_secs) {
            return Err(invalid("pause", client.pause_secs));
        }
        if client.timeout_secs > MAX_WAIT_SECS {
            return Err(invalid("timeout", client.timeout_secs));
        }
        if self.lookup.bfile_timeout_secs > MAX_WAIT_SECS {
            return Err(invalid("bfile-timeout", self.lookup.bfile_timeout_secs));
        }
        Ok(())
    }

    /// The override if set, else the estimate for `k_max`.
    pub fn effective_horizon(&self) -> Result<u64, ConfigError> {
        match self.horizon {
            Some(horizon) => Ok(horizon),
            None => horizon_for(self.k_max),
        }
    }
}

fn invalid<T: ToString>(key: &str, value: T) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
