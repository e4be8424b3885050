//! Search lookup: which known sequences start with these terms?
//!
//! Lookups are serialised through `&mut self` and rate-limited with a fixed
//! pause between consecutive requests. Failures are logged and turned into an
//! empty result.

use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::OeisError;

/// Longest pause or timeout the client will honour, in seconds.
pub const MAX_WAIT_SECS: u64 = 3600;

/// Lookup tuning. Defaults follow the public search endpoint's etiquette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Minimum pause between two requests.
    pub pause_secs: f64,
    /// Leading terms sent per query.
    pub max_terms: usize,
    /// Matches kept per query.
    pub max_results: usize,
    /// Extra attempts after a failed request.
    pub retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oeis.org".to_string(),
            timeout_secs: 10,
            pause_secs: 10.0,
            max_terms: 25,
            max_results: 1,
            retries: 0,
        }
    }
}

impl ClientConfig {
    /// Pause between requests, clamped to `0..=MAX_WAIT_SECS`. NaN falls
    /// back to the default pause.
    pub fn pause(&self) -> Duration {
        let secs = self.pause_secs.clamp(0.0, MAX_WAIT_SECS as f64);
        Duration::try_from_secs_f64(secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(ClientConfig::default().pause_secs))
    }

    /// Request timeout, clamped to `MAX_WAIT_SECS`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.min(MAX_WAIT_SECS))
    }
}

/// A sequence whose initial terms match the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMatch {
    pub number: u64,
    pub name: String,
}

impl SequenceMatch {
    /// `A` followed by the six-digit zero-padded number.
    pub fn a_number(&self) -> String {
        format!("A{:06}", self.number)
    }
}

impl std::fmt::Display for SequenceMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.a_number(), self.name)
    }
}

#[derive(Deserialize)]
struct RawEntry {
    number: Option<u64>,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchBody {
    Object { results: Option<Vec<RawEntry>> },
    List(Vec<RawEntry>),
    Other(serde_json::Value),
}

/// Decode a search response body.
///
/// Accepts `{"results": [...]}` (with `null` meaning none) or a bare array.
/// Only the first `max_results` entries are considered; entries missing a
/// number or a name are dropped.
pub fn parse_search_response(body: &str, max_results: usize) -> Result<Vec<SequenceMatch>, OeisError> {
    let parsed: SearchBody =
        serde_json::from_str(body).map_err(|e| OeisError::Malformed(e.to_string()))?;
    let entries = match parsed {
        SearchBody::Object { results } => results.unwrap_or_default(),
        SearchBody::List(entries) => entries,
        SearchBody::Other(_) => Vec::new(),
    };
    Ok(entries
        .into_iter()
        .take(max_results)
        .filter_map(|e| match (e.number, e.name) {
            (Some(number), Some(name)) if number > 0 && !name.is_empty() => {
                Some(SequenceMatch { number, name })
            }
            _ => None,
        })
        .collect())
}

/// Blocking, rate-limited search client.
pub struct OeisClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
    last_request: Option<Instant>,
}

impl OeisClient {
    pub fn new(config: ClientConfig) -> Result<Self, OeisError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            config,
            last_request: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Query URL for the leading `max_terms` of `terms`.
    pub fn query_url(&self, terms: &[u64]) -> String {
        let query = terms
            .iter()
            .take(self.config.max_terms)
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/search?fmt=json&q={}",
            self.config.base_url.trim_end_matches('/'),
            query
        )
    }

    /// Look up `terms`. Empty on empty input, no match, or any failure.
    pub fn lookup(&mut self, terms: &[u64]) -> Vec<SequenceMatch> {
        if terms.is_empty() {
            return Vec::new();
        }
        let url = self.query_url(terms);

        for attempt in 0..=self.config.retries {
            self.wait_for_slot();
            match self.fetch(&url) {
                Ok(matches) => {
                    log::debug!("{} match(es) for {}", matches.len(), url);
                    return matches;
                }
                Err(OeisError::Malformed(e)) => {
                    log::warn!("Failed to parse search response for {}: {}", url, e);
                    return Vec::new();
                }
                Err(e) => {
                    log::warn!(
                        "Search attempt {}/{} failed: {}",
                        attempt + 1,
                        self.config.retries + 1,
                        e
                    );
                }
            }
        }
        Vec::new()
    }

    fn wait_for_slot(&mut self) {
        if let Some(last) = self.last_request {
            let pause = self.config.pause();
            let elapsed = last.elapsed();
            if elapsed < pause {
                thread::sleep(pause - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }

    fn fetch(&self, url: &str) -> Result<Vec<SequenceMatch>, OeisError> {
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OeisError::Unreachable(format!("HTTP {} for {}", status, url)));
        }
        let body = response.text()?;
        parse_search_response(&body, self.config.max_results)
    }
}
