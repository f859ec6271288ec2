use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsStatsError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to connect to Jenkins at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Jenkins API request to {url} failed with status {status}")]
    Api { url: String, status: u16 },

    #[error("Jenkins API error (status {status}) after {retries} retries")]
    ApiErrorAfterRetries { status: u16, retries: u32 },

    #[error(
        "The URL {url} points to the Jenkins job '{job}', not the server root. \
         Use the server root URL, or pass the job URL with --single-job instead"
    )]
    WrongEndpoint { url: String, job: String },

    #[error(
        "Unexpected API response structure from {url}: expected 'jobs' but got [{}]",
        keys.join(", ")
    )]
    UnexpectedShape { url: String, keys: Vec<String> },

    #[error("No builds found for job at {0}; make sure the URL points to a valid Jenkins job")]
    NoBuilds(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export interrupted by user")]
    Interrupted,
}

impl JenkinsStatsError {
    /// Whether a per-job failure may be skipped without aborting the run.
    ///
    /// Artifact writes are never skipped: a run that cannot persist its
    /// output has failed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, JenkinsStatsError>;
