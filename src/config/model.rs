// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::PlatformChoice;

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [runner]
/// program = "chef-client"
/// log_flag = "-L"
///
/// [logs]
/// directory = "/var/log/chefrunner"
/// keep = 50
///
/// [dispatcher]
/// max_concurrent = 2
/// job_timeout = "30m"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub logs: LogsConfig,

    #[serde(default)]
    pub dispatcher: RawDispatcherConfig,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerConfig,
    pub logs: LogsConfig,
    pub dispatcher: DispatcherConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        runner: RunnerConfig,
        logs: LogsConfig,
        dispatcher: DispatcherConfig,
    ) -> Self {
        Self {
            runner,
            logs,
            dispatcher,
        }
    }
}

/// `[runner]` section: what program to invoke and how.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_program")]
    pub program: String,

    /// Flag that precedes the log file path.
    #[serde(default = "default_log_flag")]
    pub log_flag: String,

    /// Appended after the log flag and path.
    #[serde(default)]
    pub extra_args: Vec<String>,

    #[serde(default)]
    pub platform: PlatformChoice,
}

fn default_program() -> String {
    "chef-client".to_string()
}

fn default_log_flag() -> String {
    "-L".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            log_flag: default_log_flag(),
            extra_args: Vec::new(),
            platform: PlatformChoice::default(),
        }
    }
}

/// `[logs]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_log_extension")]
    pub extension: String,

    /// Number of newest log files to keep; 0 keeps everything.
    #[serde(default = "default_keep")]
    pub keep: usize,
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_extension() -> String {
    "log".to_string()
}

fn default_keep() -> usize {
    100
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            extension: default_log_extension(),
            keep: default_keep(),
        }
    }
}

/// `[dispatcher]` section as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDispatcherConfig {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Duration string such as `"30m"`; absent means no timeout.
    #[serde(default)]
    pub job_timeout: Option<String>,

    #[serde(default)]
    pub retain_output: bool,
}

fn default_max_concurrent() -> usize {
    1
}

fn default_queue_length() -> usize {
    16
}

impl Default for RawDispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_length: default_queue_length(),
            job_timeout: None,
            retain_output: false,
        }
    }
}

/// `[dispatcher]` section after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub max_concurrent: usize,
    pub queue_length: usize,
    pub job_timeout: Option<Duration>,
    pub retain_output: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_length: default_queue_length(),
            job_timeout: None,
            retain_output: false,
        }
    }
}
