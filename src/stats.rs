use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How statistics were gathered; decides the contributor columns of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Every job on the server (after filtering); records track job names.
    MultiJob,
    /// One job addressed directly; records also track build numbers.
    SingleJob,
}

/// Outcome of a single build as reported in its `result` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failure,
    Unstable,
    Aborted,
    /// Missing, still running, or a result name we do not categorize.
    Unknown,
}

impl BuildOutcome {
    pub fn from_result(result: Option<&str>) -> Self {
        match result.map(str::to_uppercase).as_deref() {
            Some("SUCCESS") => Self::Success,
            Some("FAILURE") => Self::Failure,
            Some("UNSTABLE") => Self::Unstable,
            Some("ABORTED") => Self::Aborted,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub total_builds: u64,
    pub successful_builds: u64,
    pub failed_builds: u64,
    pub unstable_builds: u64,
    pub aborted_builds: u64,
    /// Sum of build durations in milliseconds, counting only positive values.
    pub total_duration: u64,
    pub jobs: BTreeSet<String>,
    /// Build numbers in encounter order; only tracked in single-job mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_numbers: Option<Vec<u64>>,
}

impl StatRecord {
    pub fn record(&mut self, outcome: BuildOutcome, duration_ms: Option<i64>) {
        self.total_builds += 1;

        match outcome {
            BuildOutcome::Success => self.successful_builds += 1,
            BuildOutcome::Failure => self.failed_builds += 1,
            BuildOutcome::Unstable => self.unstable_builds += 1,
            BuildOutcome::Aborted => self.aborted_builds += 1,
            BuildOutcome::Unknown => {}
        }

        if let Some(duration) = duration_ms.and_then(|d| u64::try_from(d).ok()) {
            self.total_duration += duration;
        }
    }

    /// Adds every counter of `other` into `self` and unions the contributor lists.
    pub fn absorb(&mut self, other: StatRecord) {
        self.total_builds += other.total_builds;
        self.successful_builds += other.successful_builds;
        self.failed_builds += other.failed_builds;
        self.unstable_builds += other.unstable_builds;
        self.aborted_builds += other.aborted_builds;
        self.total_duration += other.total_duration;
        self.jobs.extend(other.jobs);

        if let Some(numbers) = other.build_numbers {
            self.build_numbers
                .get_or_insert_with(Vec::new)
                .extend(numbers);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio(&self, value: u64) -> f64 {
        if self.total_builds > 0 {
            value as f64 / self.total_builds as f64
        } else {
            0.0
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.ratio(self.successful_builds)
    }

    pub fn failure_rate(&self) -> f64 {
        self.ratio(self.failed_builds)
    }

    pub fn avg_duration_ms(&self) -> f64 {
        self.ratio(self.total_duration)
    }
}

/// Statistics keyed by parameter value, in the order values were first seen.
///
/// Equality ignores key order, so two aggregates built from the same jobs in a
/// different order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStats {
    records: IndexMap<String, StatRecord>,
}

impl ParameterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `value`, creating an empty one on first use.
    pub fn entry(&mut self, value: String) -> &mut StatRecord {
        self.records.entry(value).or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Additive merge of two aggregates.
    ///
    /// Values already present in `self` keep their position; values new to
    /// `self` are appended in the order `other` first saw them.
    #[must_use]
    pub fn merge(mut self, other: ParameterStats) -> Self {
        for (value, record) in other.records {
            self.entry(value).absorb(record);
        }
        self
    }

    pub fn total_builds(&self) -> u64 {
        self.records.values().map(|r| r.total_builds).sum()
    }

    pub fn unique_jobs(&self) -> BTreeSet<&str> {
        self.records
            .values()
            .flat_map(|r| r.jobs.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
impl ParameterStats {
    pub fn get(&self, value: &str) -> Option<&StatRecord> {
        self.records.get(value)
    }
}

impl IntoIterator for ParameterStats {
    type Item = (String, StatRecord);
    type IntoIter = indexmap::map::IntoIter<String, StatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
