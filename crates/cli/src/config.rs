//! Configuration loading and validation.
//!
//! Values are layered, last one wins:
//!
//! 1. built-in defaults (the local `ShopSphere-Simple` job, `admin`/`admin`);
//! 2. the TOML file given with `--config`, or `buildhook.toml` in the working
//!    directory when present;
//! 3. command-line flags and their `BUILDHOOK_*` environment variables.
//!
//! ```toml
//! [job]
//! url = "http://localhost:9090/job/ShopSphere-Simple"
//! request_timeout_ms = 10000
//!
//! [credentials]
//! username = "admin"
//! password = "admin"
//!
//! [monitor]
//! settle_delay_ms = 2000
//! poll_interval_ms = 3000
//! max_attempts = 5
//!
//! [event]
//! repository = "Navpan18/ShopSphere"
//! branch = "main"
//! commit = "def456new"
//! ```
//!
//! The run never starts with an invalid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use monitor::MonitorSettings;
use pipeline::{CommitSha, Credentials, GitRef, JobEndpoint, PushEventTemplate, RepositoryName};
use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "buildhook.toml";

const DEFAULT_JOB_URL: &str = "http://localhost:9090/job/ShopSphere-Simple";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reasons a configuration cannot be turned into a [`RunConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or contains keys this tool does not know.
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        /// File the text came from.
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but is outside its allowed range or format.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Names the offending key and what was expected.
        message: String,
    },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// File layer
// ---------------------------------------------------------------------------

/// Raw contents of a configuration file. Every value is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub job: JobSection,
    #[serde(default)]
    pub credentials: CredentialsSection,
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub event: EventSection,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSection {
    pub url: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    pub settle_delay_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventSection {
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
}

impl FileConfig {
    /// Parses configuration from TOML text. `origin` is only used in errors.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })
    }

    /// Loads the explicit file, or the default file when it exists, or
    /// nothing.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_owned(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&text, &path)
    }

    /// Folds command-line overrides into the file values.
    pub fn apply_job_overrides(&mut self, overrides: &JobOverrides) {
        replace(&mut self.job.url, &overrides.job_url);
        replace(&mut self.job.request_timeout_ms, &overrides.request_timeout_ms);
        replace(&mut self.credentials.username, &overrides.username);
        replace(&mut self.credentials.password, &overrides.password);
        replace(&mut self.monitor.settle_delay_ms, &overrides.settle_delay_ms);
        replace(&mut self.monitor.poll_interval_ms, &overrides.poll_interval_ms);
        replace(&mut self.monitor.max_attempts, &overrides.max_attempts);
    }

    pub fn apply_event_overrides(&mut self, overrides: &EventOverrides) {
        replace(&mut self.event.repository, &overrides.repository);
        replace(&mut self.event.branch, &overrides.branch);
        replace(&mut self.event.commit, &overrides.commit);
    }

    /// Validates the event values and builds the event template.
    pub fn event_template(&self) -> Result<PushEventTemplate, ConfigError> {
        let mut template = PushEventTemplate::default();
        if let Some(repository) = &self.event.repository {
            let name = RepositoryName::qualified(repository).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "event.repository must be 'owner/repo', got '{repository}'"
                ))
            })?;
            template = template.with_repository(name);
        }
        if let Some(branch) = &self.event.branch {
            let git_ref = GitRef::branch(branch).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "event.branch must be a branch name or refs/heads/ ref, got '{branch}'"
                ))
            })?;
            template = template.with_ref(git_ref);
        }
        if let Some(commit) = &self.event.commit {
            let sha = CommitSha::new(commit.as_str())
                .ok_or_else(|| ConfigError::invalid("event.commit must not be empty"))?;
            template = template.with_after(sha);
        }
        Ok(template)
    }

    /// Validates everything a `run` needs.
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let event = self.event_template()?;

        let url = self.job.url.as_deref().unwrap_or(DEFAULT_JOB_URL);
        let endpoint = JobEndpoint::new(url).ok_or_else(|| {
            ConfigError::invalid(format!("job.url must be an http(s) URL, got '{url}'"))
        })?;

        let request_timeout = match self.job.request_timeout_ms {
            Some(0) => return Err(ConfigError::invalid("job.request_timeout_ms must be positive")),
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let username = self
            .credentials
            .username
            .unwrap_or_else(|| DEFAULT_USERNAME.to_owned());
        if username.trim().is_empty() {
            return Err(ConfigError::invalid("credentials.username must not be empty"));
        }
        let password = self
            .credentials
            .password
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_owned());

        let defaults = MonitorSettings::default();
        let settings = MonitorSettings {
            settle_delay: self
                .monitor
                .settle_delay_ms
                .map_or(defaults.settle_delay, Duration::from_millis),
            poll_interval: self
                .monitor
                .poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
            max_attempts: self.monitor.max_attempts.unwrap_or(defaults.max_attempts),
        };
        if settings.max_attempts == 0 {
            return Err(ConfigError::invalid("monitor.max_attempts must be at least 1"));
        }

        Ok(RunConfig {
            endpoint,
            credentials: Credentials::new(username, password),
            request_timeout,
            settings,
            event,
        })
    }
}

fn replace<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

// ---------------------------------------------------------------------------
// Command-line layer
// ---------------------------------------------------------------------------

/// Flags that override the `[job]`, `[credentials]` and `[monitor]` tables.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct JobOverrides {
    /// Base URL of the CI job
    #[arg(long, env = "BUILDHOOK_JOB_URL", value_name = "URL")]
    pub job_url: Option<String>,

    /// Username for basic authentication
    #[arg(long, env = "BUILDHOOK_USERNAME")]
    pub username: Option<String>,

    /// Password or API token for basic authentication
    #[arg(long, env = "BUILDHOOK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Timeout of each HTTP request, in milliseconds
    #[arg(long, value_name = "MS")]
    pub request_timeout_ms: Option<u64>,

    /// Wait after the trigger before the first poll, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_delay_ms: Option<u64>,

    /// Wait between polls, in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Maximum number of status polls
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,
}

/// Flags that override the `[event]` table.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct EventOverrides {
    /// Repository in owner/repo form
    #[arg(long)]
    pub repository: Option<String>,

    /// Branch that received the push
    #[arg(long)]
    pub branch: Option<String>,

    /// Commit SHA at the tip of the push
    #[arg(long)]
    pub commit: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Validated configuration of a `run`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub endpoint: JobEndpoint,
    pub credentials: Credentials,
    /// Applied to each HTTP call separately.
    pub request_timeout: Duration,
    pub settings: MonitorSettings,
    /// Template of the push event; the timestamp is filled in at run time.
    pub event: PushEventTemplate,
}
