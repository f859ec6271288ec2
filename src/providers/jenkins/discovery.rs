use log::{debug, info};

use crate::error::{JenkinsStatsError, Result};

use super::client::JenkinsClient;
use super::types::{JobSummary, ServerResponse};

/// Keeps jobs whose name contains `filter` (case-insensitive), then truncates
/// to `max_jobs`. Order is preserved; `None` or `Some(0)` means no cap.
pub fn filter_jobs(
    jobs: Vec<JobSummary>,
    filter: Option<&str>,
    max_jobs: Option<usize>,
) -> Vec<JobSummary> {
    let mut jobs: Vec<JobSummary> = match filter {
        Some(pattern) => {
            let pattern = pattern.to_lowercase();
            jobs.into_iter()
                .filter(|job| job.name.to_lowercase().contains(&pattern))
                .collect()
        }
        None => jobs,
    };

    if let Some(max_jobs) = max_jobs.filter(|&max| max > 0) {
        jobs.truncate(max_jobs);
    }

    jobs
}

/// Lists the server's jobs and applies the name filter and job cap.
pub async fn discover_jobs(
    client: &JenkinsClient,
    filter: Option<&str>,
    max_jobs: Option<usize>,
) -> Result<Vec<JobSummary>> {
    info!("Fetching job list from {}", client.base_url());

    let (url, value) = client.fetch_job_listing().await?;

    let jobs = match ServerResponse::classify(value)? {
        ServerResponse::JobListing(jobs) => jobs,
        ServerResponse::SingleJob { name } => {
            return Err(JenkinsStatsError::WrongEndpoint {
                url: client.base_url().to_string(),
                job: name,
            });
        }
        ServerResponse::Unrecognized { keys } => {
            return Err(JenkinsStatsError::UnexpectedShape {
                url: url.to_string(),
                keys,
            });
        }
    };

    let listed = jobs.len();
    let jobs = filter_jobs(jobs, filter, max_jobs);

    if let Some(pattern) = filter {
        info!("Filtered {listed} jobs to those matching '{pattern}'");
    }
    for job in &jobs {
        debug!(
            "Discovered job {} ({})",
            job.name,
            job.url.as_deref().unwrap_or("no url")
        );
    }
    info!("Found {} jobs to process", jobs.len());

    Ok(jobs)
}
