//! Execution results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Measurement histogram: classical bitstring to number of shots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring`, zero if never seen.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    pub fn total_shots(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most frequent outcome; ties resolve to the smallest bitstring.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.total_shots();
        if total == 0 {
            return 0.0;
        }
        self.get(bitstring) as f64 / total as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

impl From<BTreeMap<String, u64>> for Counts {
    fn from(map: BTreeMap<String, u64>) -> Self {
        Self(map)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }
}

/// Output record of one finished job.
///
/// Serializes with the statevector as `[[re...], [im...]]`; both sequences
/// have length `2^n` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub counts: Counts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statevector: Option<(Vec<f64>, Vec<f64>)>,
    pub job_id: String,
    /// Completion time, ISO-8601.
    pub date: DateTime<Utc>,
    pub backend_name: String,
    pub backend_version: String,
    /// Wall-clock seconds from submission to completion.
    pub time_taken: f64,
    pub shots: u32,
}

impl ExecutionResult {
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            statevector: None,
            job_id: String::new(),
            date: Utc::now(),
            backend_name: String::new(),
            backend_version: String::new(),
            time_taken: 0.0,
            shots,
        }
    }

    pub fn with_statevector(mut self, real: Vec<f64>, imag: Vec<f64>) -> Self {
        self.statevector = Some((real, imag));
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_backend(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.backend_name = name.into();
        self.backend_version = version.into();
        self
    }

    pub fn with_time_taken(mut self, seconds: f64) -> Self {
        self.time_taken = seconds;
        self
    }

    pub fn get_counts(&self) -> &Counts {
        &self.counts
    }

    /// Amplitudes paired from the real and imaginary sequences.
    pub fn get_statevector(&self) -> HalResult<Vec<Complex64>> {
        let (re, im) = self
            .statevector
            .as_ref()
            .ok_or_else(|| HalError::NotAvailable("no statevector for this experiment".into()))?;
        Ok(re
            .iter()
            .zip(im)
            .map(|(&r, &i)| Complex64::new(r, i))
            .collect())
    }
}
