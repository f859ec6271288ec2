use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 4] = [
    "jenkins-stats.toml",
    "jenkins-stats.json",
    "jenkins-stats.yaml",
    "jenkins-stats.yml",
];

/// Configuration file structure for jenkins-stats.
///
/// Holds defaults for a server that is analyzed repeatedly. Command-line flags
/// always take precedence over values loaded here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins server root URL (or a job URL for single-job runs)
    pub url: Option<String>,

    /// netrc file holding credentials; `~/.netrc` when unset
    pub netrc: Option<PathBuf>,

    /// Maximum number of jobs to process; unlimited when unset, 0 or negative
    pub max_jobs: Option<i64>,

    /// Maximum number of builds fetched per job
    #[serde(default = "default_max_builds")]
    pub max_builds: u32,

    /// Only process jobs whose name contains this text (case-insensitive)
    pub filter: Option<String>,

    /// Seconds to wait before each job's API call
    #[serde(default = "default_delay")]
    pub delay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving every artifact
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Save each job's config.xml
    #[serde(default)]
    pub export_configs: bool,

    /// Save each job's raw build JSON
    #[serde(default)]
    pub export_build_data: bool,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: None,
            netrc: None,
            max_jobs: None,
            max_builds: default_max_builds(),
            filter: None,
            delay: default_delay(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            export_configs: false,
            export_build_data: false,
        }
    }
}

fn default_max_builds() -> u32 {
    100
}

fn default_delay() -> f64 {
    0.1
}

fn default_directory() -> PathBuf {
    PathBuf::from("jenkins_export")
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Uses `path` when given, otherwise the first of `jenkins-stats.toml`,
    /// `.json`, `.yaml` and `.yml` found in the working directory. Returns
    /// defaults when no file exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from_path(path),
            Some(path) => {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => match find_in(Path::new(".")) {
                Some(path) => Self::load_from_path(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.jenkins.max_builds, 100);
        assert!((config.jenkins.delay - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.jenkins.max_jobs, None);
        assert_eq!(config.output.directory, PathBuf::from("jenkins_export"));
        assert!(!config.output.export_configs);
        assert!(!config.output.export_build_data);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[jenkins]
url = "https://jenkins.example.com"
netrc = "/etc/jenkins.netrc"
max-jobs = 25
max-builds = 40
filter = "deploy"
delay = 0.5

[output]
directory = "reports"
export-configs = true
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(
            config.jenkins.url.as_deref(),
            Some("https://jenkins.example.com")
        );
        assert_eq!(
            config.jenkins.netrc,
            Some(PathBuf::from("/etc/jenkins.netrc"))
        );
        assert_eq!(config.jenkins.max_jobs, Some(25));
        assert_eq!(config.jenkins.max_builds, 40);
        assert_eq!(config.jenkins.filter.as_deref(), Some("deploy"));
        assert!((config.jenkins.delay - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.output.directory, PathBuf::from("reports"));
        assert!(config.output.export_configs);
        assert!(!config.output.export_build_data);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "jenkins": { "url": "http://ci.local:8080", "max-builds": 10 },
  "output": { "export-build-data": true }
}"#;
        write!(temp_file, "{json_content}").unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.jenkins.url.as_deref(), Some("http://ci.local:8080"));
        assert_eq!(config.jenkins.max_builds, 10);
        assert!((config.jenkins.delay - 0.1).abs() < f64::EPSILON);
        assert!(config.output.export_build_data);
        assert_eq!(config.output.directory, PathBuf::from("jenkins_export"));
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "jenkins:\n  filter: api\n  max-jobs: 3\n").unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.jenkins.filter.as_deref(), Some("api"));
        assert_eq!(config.jenkins.max_jobs, Some(3));
    }

    #[test]
    fn test_load_negative_max_jobs() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[jenkins]\nmax-jobs = -1\n").unwrap();

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.jenkins.max_jobs, Some(-1));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[jenkins]\nmax-builds = \"many\"\n").unwrap();

        let err = Config::load(Some(temp_file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load(Some(Path::new("nonexistent-jenkins-stats.toml"))).unwrap();
        assert_eq!(config.jenkins.max_builds, 100);
        assert_eq!(config.jenkins.url, None);
    }

    #[test]
    fn test_find_in_prefers_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(find_in(temp_dir.path()), None);

        std::fs::write(temp_dir.path().join("jenkins-stats.yml"), "jenkins: {}\n").unwrap();
        std::fs::write(temp_dir.path().join("jenkins-stats.toml"), "").unwrap();

        assert_eq!(
            find_in(temp_dir.path()),
            Some(temp_dir.path().join("jenkins-stats.toml"))
        );
    }
}
