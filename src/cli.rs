use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{default_netrc_path, resolve_credentials};
use crate::config::Config;
use crate::error::JenkinsStatsError;
use crate::output::{
    count, failure, label, print_summary, success, value, ArtifactWriter, ParameterReport,
};
use crate::providers::{parse_base_url, CollectOptions, JenkinsProvider, ParameterProbe};

#[derive(Parser)]
#[command(name = "jenkins-stats")]
#[command(
    author,
    version,
    about = "Jenkins build statistics grouped by a build parameter",
    long_about = None
)]
pub struct Cli {
    /// Jenkins server root URL, or a job URL with --single-job
    #[arg(env = "JENKINS_URL")]
    url: Option<String>,

    /// Build parameter to group statistics by (e.g. environment)
    #[arg(short, long)]
    parameter: String,

    /// Maximum number of jobs to process; 0 or negative means all [default: unlimited]
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    max_jobs: Option<i64>,

    /// Maximum number of builds fetched per job [default: 100]
    #[arg(short = 'b', long)]
    max_builds: Option<u32>,

    /// Only process jobs whose name contains this text (case-insensitive)
    #[arg(short, long)]
    filter: Option<String>,

    /// Output directory [default: jenkins_export]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds to wait before each job's API call [default: 0.1]
    #[arg(long, allow_negative_numbers = true)]
    delay: Option<f64>,

    /// netrc file with credentials [default: ~/.netrc]
    #[arg(long)]
    netrc: Option<PathBuf>,

    /// Configuration file [default: ./jenkins-stats.{toml,json,yaml,yml}]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save each job's config.xml
    #[arg(long)]
    export_configs: bool,

    /// Save each job's raw build JSON
    #[arg(long)]
    export_build_data: bool,

    /// Treat the URL as a single job instead of a server root
    #[arg(long)]
    single_job: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

/// How a run ended when it did not fail outright.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Statistics were produced and written to these files.
    Exported(Vec<PathBuf>),
    /// No build carried the parameter; nothing was written.
    NoData,
}

/// Settings after merging flags, the config file and defaults.
#[derive(Debug)]
struct Settings {
    url: String,
    host: String,
    parameter: String,
    max_jobs: Option<usize>,
    max_builds: u32,
    filter: Option<String>,
    output_dir: PathBuf,
    delay: Duration,
    netrc: Option<PathBuf>,
    export_configs: bool,
    export_build_data: bool,
    single_job: bool,
    show_progress: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Result<Self> {
        let Config { jenkins, output } = config;

        let Some(url) = cli.url.clone().or(jenkins.url) else {
            bail!(JenkinsStatsError::Config(
                "No Jenkins URL given; pass it as an argument or set JENKINS_URL".to_string()
            ));
        };
        let parsed = parse_base_url(&url)?;
        let host = parsed.host_str().unwrap_or_default().to_string();

        let parameter = cli.parameter.trim().to_string();
        if parameter.is_empty() {
            bail!(JenkinsStatsError::Config(
                "Parameter name must not be empty".to_string()
            ));
        }

        let delay_secs = cli.delay.unwrap_or(jenkins.delay);
        let delay = Duration::try_from_secs_f64(delay_secs).map_err(|_| {
            JenkinsStatsError::Config(format!(
                "Delay must be a non-negative number of seconds, got {delay_secs}"
            ))
        })?;

        Ok(Self {
            url,
            host,
            parameter,
            max_jobs: cli
                .max_jobs
                .or(jenkins.max_jobs)
                .and_then(|n| usize::try_from(n).ok())
                .filter(|&n| n > 0),
            max_builds: cli.max_builds.unwrap_or(jenkins.max_builds),
            filter: cli.filter.clone().or(jenkins.filter),
            output_dir: cli.output.clone().unwrap_or(output.directory),
            delay,
            netrc: cli.netrc.clone().or(jenkins.netrc).or_else(default_netrc_path),
            export_configs: cli.export_configs || output.export_configs,
            export_build_data: cli.export_build_data || output.export_build_data,
            single_job: cli.single_job,
            show_progress: !cli.no_progress,
        })
    }

    fn log(&self) {
        debug!("URL: {}", self.url);
        debug!("Parameter: {}", self.parameter);
        debug!(
            "Mode: {}",
            if self.single_job { "single job" } else { "all jobs" }
        );
        debug!(
            "Max jobs: {}",
            self.max_jobs
                .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
        );
        debug!("Max builds per job: {}", self.max_builds);
        debug!("Filter: {}", self.filter.as_deref().unwrap_or("none"));
        debug!("Delay: {:?}", self.delay);
        debug!("Output directory: {}", self.output_dir.display());
        debug!(
            "Export configs: {}, export build data: {}",
            self.export_configs, self.export_build_data
        );
    }

    fn collect_options(&self) -> CollectOptions<'_> {
        CollectOptions {
            parameter: &self.parameter,
            filter: self.filter.as_deref(),
            max_jobs: self.max_jobs,
            max_builds: self.max_builds,
            export_configs: self.export_configs,
            export_build_data: self.export_build_data,
            show_progress: self.show_progress,
        }
    }
}

fn print_probe(parameter: &str, probe: &ParameterProbe) {
    let build = probe
        .latest_build
        .map_or_else(String::new, |n| format!(" (latest build #{n})"));

    if probe.names.is_empty() {
        eprintln!(
            "{} No parameters found in the most recent builds{build}",
            label("hint:")
        );
    } else {
        eprintln!(
            "{} Parameter '{}' not found. Available parameters{build}: {}",
            label("hint:"),
            value(parameter),
            count(probe.names.join(", "))
        );
    }
}

impl Cli {
    /// Runs the export and writes the summary artifacts.
    ///
    /// Ctrl-C aborts the run before any summary artifact is written.
    pub async fn execute(&self) -> Result<Outcome> {
        let config = Config::load(self.config.as_deref())?;
        let settings = Settings::resolve(self, config)?;

        if self.verbose {
            settings.log();
        }

        let credentials = settings
            .netrc
            .as_deref()
            .and_then(|path| resolve_credentials(path, &settings.host));

        let provider = JenkinsProvider::new(&settings.url, credentials, settings.delay)?;
        let artifacts = ArtifactWriter::new(settings.output_dir.clone());
        let options = settings.collect_options();

        info!(
            "Collecting statistics for parameter '{}' from {}",
            settings.parameter, settings.url
        );

        let run = async {
            if settings.single_job {
                provider.analyze_single_job(&options, &artifacts).await
            } else {
                provider.collect_statistics(&options, &artifacts).await
            }
        };

        let collection = tokio::select! {
            result = run => result?,
            _ = tokio::signal::ctrl_c() => {
                return Err(JenkinsStatsError::Interrupted.into());
            }
        };

        if collection.stats.is_empty() {
            if let Some(probe) = &collection.probe {
                print_probe(&settings.parameter, probe);
            }
            eprintln!(
                "{} No statistics collected for parameter '{}'",
                failure("✗"),
                settings.parameter
            );
            return Ok(Outcome::NoData);
        }

        let report =
            ParameterReport::from_collection(&settings.url, &settings.parameter, collection);
        let paths = artifacts.write_report(&report).with_context(|| {
            format!("Failed to write statistics to {}", artifacts.dir().display())
        })?;

        print_summary(&report);

        if !report.failed_jobs.is_empty() {
            eprintln!(
                "{} {} job(s) could not be fetched",
                failure("!"),
                report.failed_jobs.len()
            );
        }
        eprintln!(
            "{} Export completed: {}",
            success("✓"),
            artifacts.dir().display()
        );

        Ok(Outcome::Exported(paths))
    }
}
