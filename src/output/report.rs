use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::providers::Collection;
use crate::stats::{AnalysisMode, StatRecord};

/// A [`StatRecord`] together with the rates and averages derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub record: StatRecord,
    /// Fraction in `0.0..=1.0`.
    pub success_rate: f64,
    /// Fraction in `0.0..=1.0`.
    pub failure_rate: f64,
    pub avg_duration_ms: f64,
    pub avg_duration_min: f64,
}

impl From<StatRecord> for DerivedRecord {
    fn from(record: StatRecord) -> Self {
        let avg_duration_ms = record.avg_duration_ms();
        Self {
            success_rate: record.success_rate(),
            failure_rate: record.failure_rate(),
            avg_duration_ms,
            avg_duration_min: avg_duration_ms / 60_000.0,
            record,
        }
    }
}

/// A job that was skipped because its fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedJob {
    pub job: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub value: String,
    pub stats: DerivedRecord,
}

/// Read-only view of one run, ready for export and display.
#[derive(Debug)]
pub struct ParameterReport {
    pub server: String,
    pub parameter: String,
    pub mode: AnalysisMode,
    pub collected_at: DateTime<Utc>,
    pub jobs_total: usize,
    pub jobs_with_stats: usize,
    pub failed_jobs: Vec<FailedJob>,
    pub total_builds: u64,
    pub unique_jobs: usize,
    /// Sorted by descending build count; equal counts keep first-seen order.
    pub rows: Vec<ReportRow>,
}

impl ParameterReport {
    pub fn from_collection(server: &str, parameter: &str, collection: Collection) -> Self {
        let total_builds = collection.stats.total_builds();
        let unique_jobs = collection.stats.unique_jobs().len();

        let mut rows: Vec<ReportRow> = collection
            .stats
            .into_iter()
            .map(|(value, record)| ReportRow {
                value,
                stats: record.into(),
            })
            .collect();
        // `sort_by` is stable, which keeps ties in creation order.
        rows.sort_by(|a, b| b.stats.record.total_builds.cmp(&a.stats.record.total_builds));

        Self {
            server: server.to_string(),
            parameter: parameter.to_string(),
            mode: collection.mode,
            collected_at: Utc::now(),
            jobs_total: collection.jobs_total,
            jobs_with_stats: collection.jobs_with_stats,
            failed_jobs: collection
                .failures
                .into_iter()
                .map(|failure| FailedJob {
                    reason: failure.error.to_string(),
                    job: failure.job,
                })
                .collect(),
            total_builds,
            unique_jobs,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn json_file_name(&self) -> String {
        format!("statistics_by_{}.json", self.parameter)
    }

    pub fn csv_file_name(&self) -> String {
        format!("statistics_by_{}.csv", self.parameter)
    }
}
