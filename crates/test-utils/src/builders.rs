#![allow(dead_code)]

use std::path::Path;

use chefrunner::config::{ConfigFile, RawConfigFile};
use chefrunner::types::PlatformChoice;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.runner.program = program.to_string();
        self
    }

    pub fn extra_arg(mut self, arg: &str) -> Self {
        self.config.runner.extra_args.push(arg.to_string());
        self
    }

    pub fn platform(mut self, platform: PlatformChoice) -> Self {
        self.config.runner.platform = platform;
        self
    }

    pub fn log_dir(mut self, dir: &Path) -> Self {
        self.config.logs.directory = dir.to_path_buf();
        self
    }

    pub fn keep_logs(mut self, keep: usize) -> Self {
        self.config.logs.keep = keep;
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.dispatcher.max_concurrent = n;
        self
    }

    pub fn queue_length(mut self, n: usize) -> Self {
        self.config.dispatcher.queue_length = n;
        self
    }

    pub fn job_timeout(mut self, timeout: &str) -> Self {
        self.config.dispatcher.job_timeout = Some(timeout.to_string());
        self
    }

    pub fn retain_output(mut self, val: bool) -> Self {
        self.config.dispatcher.retain_output = val;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
