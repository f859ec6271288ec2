use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::stats::{BuildOutcome, ParameterStats};

use super::client::JenkinsClient;
use super::parameters::extract_parameter_value;
use super::types::{Build, BuildsResponse};

/// Folds builds into per-value statistics for one job.
pub struct BuildStatsAccumulator<'a> {
    parameter: &'a str,
    job_name: &'a str,
    track_build_numbers: bool,
    matched: usize,
    stats: ParameterStats,
}

impl<'a> BuildStatsAccumulator<'a> {
    pub fn new(parameter: &'a str, job_name: &'a str) -> Self {
        Self {
            parameter,
            job_name,
            track_build_numbers: false,
            matched: 0,
            stats: ParameterStats::new(),
        }
    }

    /// Also records build numbers per value, in the order builds are added.
    #[must_use]
    pub fn tracking_build_numbers(mut self) -> Self {
        self.track_build_numbers = true;
        self
    }

    /// Adds one build. Returns `false` (and changes nothing) when the build
    /// does not carry the target parameter.
    pub fn add(&mut self, build: &Build) -> bool {
        let Some(value) = extract_parameter_value(build, self.parameter) else {
            return false;
        };

        let record = self.stats.entry(value);
        record.jobs.insert(self.job_name.to_string());
        if self.track_build_numbers {
            record
                .build_numbers
                .get_or_insert_with(Vec::new)
                .push(build.number);
        }
        record.record(
            BuildOutcome::from_result(build.result.as_deref()),
            build.duration,
        );

        self.matched += 1;
        true
    }

    pub fn extend<'b>(&mut self, builds: impl IntoIterator<Item = &'b Build>) {
        for build in builds {
            self.add(build);
        }
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn finish(self) -> ParameterStats {
        self.stats
    }
}

/// A job's build history as fetched, plus the raw body for export.
pub struct JobBuilds {
    pub display_name: Option<String>,
    pub builds: Option<Vec<Build>>,
    pub raw: Value,
}

impl JobBuilds {
    pub fn from_raw(raw: Value) -> Result<Self> {
        let response = BuildsResponse::deserialize(&raw)?;
        Ok(Self {
            display_name: response.name,
            builds: response.builds,
            raw,
        })
    }

    pub fn builds(&self) -> &[Build] {
        self.builds.as_deref().unwrap_or_default()
    }
}

/// Statistics for one job of a multi-job run.
pub struct JobStats {
    pub stats: ParameterStats,
    pub builds_seen: usize,
    pub raw_builds: Value,
}

/// Fetches up to `max_builds` of `job_name`'s latest builds and accumulates
/// those carrying `parameter`.
pub async fn collect_job_stats(
    client: &JenkinsClient,
    job_name: &str,
    parameter: &str,
    max_builds: u32,
) -> Result<JobStats> {
    let job_url = client.job_endpoint(job_name, &[])?;
    let job_builds = JobBuilds::from_raw(client.fetch_builds(&job_url, max_builds, false).await?)?;

    let mut accumulator = BuildStatsAccumulator::new(parameter, job_name);
    accumulator.extend(job_builds.builds());

    debug!(
        "Job {job_name}: {}/{} builds carry parameter '{parameter}'",
        accumulator.matched(),
        job_builds.builds().len()
    );

    Ok(JobStats {
        builds_seen: job_builds.builds().len(),
        stats: accumulator.finish(),
        raw_builds: job_builds.raw,
    })
}
