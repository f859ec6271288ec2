use log::info;
use serde_json::Value;

use crate::error::{JenkinsStatsError, Result};
use crate::stats::ParameterStats;

use super::client::JenkinsClient;
use super::collector::{BuildStatsAccumulator, JobBuilds};
use super::parameters::{probe_parameter_names, ParameterProbe};

const JOB_SEGMENT: &str = "/job/";

/// Extracts the job name from a job URL: the segment after the last `/job/`.
///
/// `http://jenkins/job/folder/job/project/` yields `project`. A URL without a
/// `/job/` segment is a configuration error.
pub fn job_name_from_url(url: &str) -> Result<String> {
    let Some((_, tail)) = url.rsplit_once(JOB_SEGMENT) else {
        return Err(JenkinsStatsError::Config(format!(
            "For single job analysis, the URL must contain '/job/' \
             (e.g. http://jenkins.example.com/job/my-project), got: {url}"
        )));
    };

    let name = tail.split('/').next().unwrap_or_default();
    if name.is_empty() {
        return Err(JenkinsStatsError::Config(format!(
            "No job name after '/job/' in URL: {url}"
        )));
    }

    Ok(name.to_string())
}

#[derive(Debug)]
pub struct SingleJobAnalysis {
    pub job_name: String,
    pub builds_seen: usize,
    pub stats: ParameterStats,
    /// Present when no build carried the parameter.
    pub probe: Option<ParameterProbe>,
    pub raw_builds: Value,
}

/// Analyzes the job at the client's base URL.
///
/// The caller must have validated the URL with [`job_name_from_url`]; `job_name`
/// is used until the API reports the job's own name.
pub async fn analyze_job(
    client: &JenkinsClient,
    job_name: &str,
    parameter: &str,
    max_builds: u32,
) -> Result<SingleJobAnalysis> {
    info!("Analyzing single job: {}", client.base_url());

    let raw = client
        .fetch_builds(client.base_url(), max_builds, true)
        .await?;
    let job_builds = JobBuilds::from_raw(raw)?;

    let Some(builds) = job_builds.builds.as_deref() else {
        return Err(JenkinsStatsError::NoBuilds(client.base_url().to_string()));
    };

    let display_name = job_builds
        .display_name
        .clone()
        .unwrap_or_else(|| job_name.to_string());

    info!(
        "Found {} builds for job '{display_name}', looking for parameter '{parameter}'",
        builds.len()
    );

    let mut accumulator =
        BuildStatsAccumulator::new(parameter, &display_name).tracking_build_numbers();
    accumulator.extend(builds);
    info!(
        "Processed {} builds with parameter '{parameter}'",
        accumulator.matched()
    );

    let stats = accumulator.finish();
    let probe = stats.is_empty().then(|| probe_parameter_names(builds));

    Ok(SingleJobAnalysis {
        builds_seen: builds.len(),
        stats,
        probe,
        raw_builds: job_builds.raw,
        job_name: display_name,
    })
}
