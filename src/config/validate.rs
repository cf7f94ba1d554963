// src/config/validate.rs

use crate::config::model::{
    ConfigFile, DispatcherConfig, LogsConfig, RawConfigFile, RawDispatcherConfig, RunnerConfig,
};
use crate::errors::{ChefRunnerError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ChefRunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_runner(&raw.runner)?;
        validate_logs(&raw.logs)?;
        let dispatcher = validate_dispatcher(&raw.dispatcher)?;
        Ok(ConfigFile::new_unchecked(raw.runner, raw.logs, dispatcher))
    }
}

fn validate_runner(runner: &RunnerConfig) -> Result<()> {
    if runner.program.trim().is_empty() {
        return Err(ChefRunnerError::ConfigError(
            "[runner].program must not be empty".to_string(),
        ));
    }
    if runner.log_flag.trim().is_empty() {
        return Err(ChefRunnerError::ConfigError(
            "[runner].log_flag must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_logs(logs: &LogsConfig) -> Result<()> {
    if logs.directory.as_os_str().is_empty() {
        return Err(ChefRunnerError::ConfigError(
            "[logs].directory must not be empty".to_string(),
        ));
    }

    let ext = logs.extension.trim();
    if ext.is_empty() {
        return Err(ChefRunnerError::ConfigError(
            "[logs].extension must not be empty".to_string(),
        ));
    }
    if ext.contains(['/', '\\']) {
        return Err(ChefRunnerError::ConfigError(format!(
            "[logs].extension must not contain path separators (got '{}')",
            ext
        )));
    }
    Ok(())
}

fn validate_dispatcher(raw: &RawDispatcherConfig) -> Result<DispatcherConfig> {
    if raw.max_concurrent == 0 {
        return Err(ChefRunnerError::ConfigError(
            "[dispatcher].max_concurrent must be >= 1 (got 0)".to_string(),
        ));
    }
    if raw.queue_length == 0 {
        return Err(ChefRunnerError::ConfigError(
            "[dispatcher].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }

    let job_timeout = match raw.job_timeout.as_deref() {
        None => None,
        Some(s) => {
            let d = parse_duration(s).map_err(|e| {
                ChefRunnerError::ConfigError(format!("[dispatcher].job_timeout: {e}"))
            })?;
            if d.is_zero() {
                return Err(ChefRunnerError::ConfigError(
                    "[dispatcher].job_timeout must be greater than zero".to_string(),
                ));
            }
            Some(d)
        }
    };

    Ok(DispatcherConfig {
        max_concurrent: raw.max_concurrent,
        queue_length: raw.queue_length,
        job_timeout,
        retain_output: raw.retain_output,
    })
}
