use std::time::Duration;

use log::{debug, info, warn};

use crate::auth::Credentials;
use crate::error::{JenkinsStatsError, Result};
use crate::output::ArtifactWriter;
use crate::stats::{AnalysisMode, ParameterStats};

use super::client::JenkinsClient;
use super::collector::collect_job_stats;
use super::discovery::discover_jobs;
use super::parameters::ParameterProbe;
use super::progress_bar::JobProgress;
use super::single_job::{analyze_job, job_name_from_url};

/// What to collect and which per-job artifacts to export.
#[derive(Debug, Clone)]
pub struct CollectOptions<'a> {
    pub parameter: &'a str,
    pub filter: Option<&'a str>,
    pub max_jobs: Option<usize>,
    pub max_builds: u32,
    pub export_configs: bool,
    pub export_build_data: bool,
    pub show_progress: bool,
}

/// A job whose fetch failed and which contributed nothing.
#[derive(Debug)]
pub struct JobFailure {
    pub job: String,
    pub error: JenkinsStatsError,
}

/// Outcome of a collection run, before formatting.
#[derive(Debug)]
pub struct Collection {
    pub mode: AnalysisMode,
    pub stats: ParameterStats,
    pub jobs_total: usize,
    pub jobs_with_stats: usize,
    pub failures: Vec<JobFailure>,
    /// Parameter names seen in recent builds, set when single-job mode found
    /// no build carrying the parameter.
    pub probe: Option<ParameterProbe>,
}

/// Collects build statistics grouped by a parameter from a Jenkins server.
///
/// Requests are issued one at a time; `delay` is awaited before each job so
/// large servers are not flooded.
pub struct JenkinsProvider {
    client: JenkinsClient,
    delay: Duration,
}

impl JenkinsProvider {
    /// Creates a provider for a server root (or a job URL in single-job mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid http(s) URL.
    pub fn new(url: &str, credentials: Option<Credentials>, delay: Duration) -> Result<Self> {
        Ok(Self {
            client: JenkinsClient::new(url, credentials)?,
            delay,
        })
    }

    /// Collects statistics across every job on the server.
    ///
    /// Jobs are listed once, filtered and capped, then processed in listing
    /// order. A job whose fetch fails is logged and recorded in
    /// [`Collection::failures`]; it never aborts the run.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The job listing cannot be fetched or has an unexpected shape
    /// - A per-job artifact cannot be written
    pub async fn collect_statistics(
        &self,
        options: &CollectOptions<'_>,
        artifacts: &ArtifactWriter,
    ) -> Result<Collection> {
        let jobs = discover_jobs(&self.client, options.filter, options.max_jobs).await?;

        let mut collection = Collection {
            mode: AnalysisMode::MultiJob,
            stats: ParameterStats::new(),
            jobs_total: jobs.len(),
            jobs_with_stats: 0,
            failures: Vec::new(),
            probe: None,
        };

        if jobs.is_empty() {
            warn!("No jobs found matching criteria");
            return Ok(collection);
        }

        info!(
            "Processing {} jobs, looking for parameter '{}' in up to {} builds per job",
            jobs.len(),
            options.parameter,
            options.max_builds
        );

        let progress = JobProgress::start(jobs.len(), options.show_progress);

        for (index, job) in jobs.iter().enumerate() {
            progress.processing(index + 1, &job.name);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.process_job(&job.name, options, artifacts).await {
                Ok(job_stats) => {
                    if !job_stats.is_empty() {
                        collection.jobs_with_stats += 1;
                    }
                    collection.stats = collection.stats.merge(job_stats);
                }
                Err(error) if error.is_recoverable() => {
                    warn!("Error processing job {}: {error}", job.name);
                    collection.failures.push(JobFailure {
                        job: job.name.clone(),
                        error,
                    });
                }
                Err(error) => {
                    progress.abandon();
                    return Err(error);
                }
            }

            progress.advance();
        }

        progress.finish(collection.jobs_with_stats);

        info!(
            "Successfully processed {}/{} jobs ({} failed), {} parameter values found",
            collection.jobs_with_stats,
            collection.jobs_total,
            collection.failures.len(),
            collection.stats.len()
        );

        Ok(collection)
    }

    async fn process_job(
        &self,
        job_name: &str,
        options: &CollectOptions<'_>,
        artifacts: &ArtifactWriter,
    ) -> Result<ParameterStats> {
        if options.export_configs {
            let config_xml = self.client.fetch_job_config(job_name).await?;
            artifacts.write(&format!("{job_name}_config.xml"), config_xml.as_bytes())?;
        }

        let job = collect_job_stats(
            &self.client,
            job_name,
            options.parameter,
            options.max_builds,
        )
        .await?;

        if job.stats.is_empty() {
            debug!(
                "Job {job_name}: none of {} builds carry parameter '{}'",
                job.builds_seen, options.parameter
            );
        } else if options.export_build_data {
            artifacts.write_json(&format!("{job_name}_builds.json"), &job.raw_builds)?;
        }

        Ok(job.stats)
    }

    /// Analyzes the single job the provider's URL points at.
    ///
    /// Records carry the job's display name and the build numbers of every
    /// matching build.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no `/job/` segment (before any request
    /// is made), if the job cannot be fetched, or if the response has no
    /// builds.
    pub async fn analyze_single_job(
        &self,
        options: &CollectOptions<'_>,
        artifacts: &ArtifactWriter,
    ) -> Result<Collection> {
        let job_name = job_name_from_url(self.client.base_url().as_str())?;

        let analysis = analyze_job(
            &self.client,
            &job_name,
            options.parameter,
            options.max_builds,
        )
        .await?;

        if options.export_build_data && !analysis.stats.is_empty() {
            artifacts.write_json(&format!("{job_name}_builds.json"), &analysis.raw_builds)?;
        }

        info!(
            "Job '{}': {} builds inspected, {} parameter values found",
            analysis.job_name,
            analysis.builds_seen,
            analysis.stats.len()
        );

        Ok(Collection {
            mode: AnalysisMode::SingleJob,
            jobs_total: 1,
            jobs_with_stats: usize::from(!analysis.stats.is_empty()),
            failures: Vec::new(),
            probe: analysis.probe,
            stats: analysis.stats,
        })
    }
}
