use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{ChefRunnerError, Result};

/// Integer status of an external process. Zero is success.
pub type ExitCode = i32;

/// Exit code reported for jobs whose process never started, and for
/// processes that were terminated by a signal.
pub const LAUNCH_FAILURE_CODE: ExitCode = -1;

/// Opaque identifier of a single chef run.
///
/// The id doubles as the log file stem, so it is restricted to characters
/// that are safe in a file name on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(ChefRunnerError::InvalidJobId(
                "job id must not be empty".to_string(),
            ));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(ChefRunnerError::InvalidJobId(format!(
                "'{trimmed}' is not a usable job id"
            )));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ChefRunnerError::InvalidJobId(format!(
                "'{trimmed}' contains unsupported character {bad:?}"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Fresh random id (UUID v4) for callers that do not bring their own.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = ChefRunnerError;

    fn from_str(s: &str) -> Result<Self> {
        JobId::new(s)
    }
}

/// Which run strategy to use; `Auto` picks by the host OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformChoice {
    #[default]
    Auto,
    Windows,
    Unix,
}

impl fmt::Display for PlatformChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlatformChoice::Auto => "auto",
            PlatformChoice::Windows => "windows",
            PlatformChoice::Unix => "unix",
        };
        f.write_str(s)
    }
}

/// Parse durations like `"500ms"`, `"30s"`, `"15m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration too large".to_string())
}
