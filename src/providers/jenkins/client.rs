use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::auth::Credentials;
use crate::error::{JenkinsStatsError, Result};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_SECONDS: u64 = 5;

/// Fields requested for every build in a job's build history.
const BUILD_FIELDS: &str = "number,result,duration,timestamp,actions[parameters[name,value]]";

pub(super) const JOB_LISTING_TREE: &str = "jobs[name,url,fullName]";

/// Tree projection for a job's latest `max_builds` builds.
pub(super) fn builds_tree(max_builds: u32, include_name: bool) -> String {
    let prefix = if include_name { "name," } else { "" };
    format!("{prefix}builds[{BUILD_FIELDS}]{{0,{max_builds}}}")
}

/// Client for the Jenkins JSON API of one server (or one job in single-job mode).
pub struct JenkinsClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl JenkinsClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jenkins-stats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JenkinsStatsError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = parse_base_url(base_url)?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(credentials) = &self.credentials {
            request.basic_auth(credentials.login(), Some(credentials.password()))
        } else {
            request
        }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                JenkinsStatsError::Config(format!("URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a top-level job relative to the server root.
    pub fn job_endpoint(&self, job_name: &str, tail: &[&str]) -> Result<Url> {
        let mut segments = vec!["job", job_name];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    async fn send(&self, url: &Url, tree: Option<&str>) -> Result<reqwest::Response> {
        let mut retry_count = 0;
        loop {
            let mut request = self.client.get(url.clone());
            if let Some(tree) = tree {
                request = request.query(&[("tree", tree)]);
            }

            debug!("GET {url}");
            let response = self
                .auth_request(request)
                .send()
                .await
                .map_err(|source| JenkinsStatsError::Connection {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
            {
                if retry_count >= MAX_RETRIES {
                    return Err(JenkinsStatsError::ApiErrorAfterRetries {
                        status: status.as_u16(),
                        retries: MAX_RETRIES,
                    });
                }

                warn!(
                    "Jenkins API error (status {status}). Waiting {RETRY_DELAY_SECONDS} seconds before retry {}/{}...",
                    retry_count + 1,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                return Err(JenkinsStatsError::Api {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }
    }

    pub async fn get_text(&self, url: &Url, tree: Option<&str>) -> Result<String> {
        self.send(url, tree)
            .await?
            .text()
            .await
            .map_err(|source| JenkinsStatsError::Connection {
                url: url.to_string(),
                source,
            })
    }

    pub async fn get_json(&self, url: &Url, tree: Option<&str>) -> Result<Value> {
        let body = self.get_text(url, tree).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches the job listing of the server root.
    pub async fn fetch_job_listing(&self) -> Result<(Url, Value)> {
        let url = self.endpoint(&["api", "json"])?;
        let value = self.get_json(&url, Some(JOB_LISTING_TREE)).await?;
        Ok((url, value))
    }

    /// Fetches the build history of the job rooted at `job_url`.
    pub async fn fetch_builds(
        &self,
        job_url: &Url,
        max_builds: u32,
        include_name: bool,
    ) -> Result<Value> {
        let mut url = job_url.clone();
        url.path_segments_mut()
            .map_err(|()| JenkinsStatsError::Config(format!("URL cannot be a base: {job_url}")))?
            .pop_if_empty()
            .extend(["api", "json"]);

        let tree = builds_tree(max_builds, include_name);
        self.get_json(&url, Some(&tree)).await
    }

    pub async fn fetch_job_config(&self, job_name: &str) -> Result<String> {
        let url = self.job_endpoint(job_name, &["config.xml"])?;
        self.get_text(&url, None).await
    }
}

/// Validates a user-supplied Jenkins URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| JenkinsStatsError::Config(format!("Invalid Jenkins URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(JenkinsStatsError::Config(format!(
            "Invalid Jenkins URL '{raw}': must start with http:// or https://"
        )));
    }

    Ok(url)
}
