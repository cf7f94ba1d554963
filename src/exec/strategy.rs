// src/exec/strategy.rs

//! Per-platform construction of the chef command line.
//!
//! The strategy is chosen once at startup by [`select`]; nothing downstream
//! branches on the host OS.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use crate::config::RunnerConfig;
use crate::types::PlatformChoice;

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

pub trait RunStrategy: Send + Sync + Debug {
    /// Short name used in logs and dry-run output.
    fn name(&self) -> &'static str;

    /// Build the command that runs chef, logging into `log_path`.
    fn command(&self, log_path: &Path) -> CommandSpec;
}

#[derive(Debug, Clone)]
pub struct WindowsStrategy {
    program: String,
    log_flag: String,
    extra_args: Vec<String>,
}

impl WindowsStrategy {
    pub fn from_config(cfg: &RunnerConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            log_flag: cfg.log_flag.clone(),
            extra_args: cfg.extra_args.clone(),
        }
    }
}

impl RunStrategy for WindowsStrategy {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn command(&self, log_path: &Path) -> CommandSpec {
        // chef-client on Windows expects native separators in -L.
        let path = log_path.to_string_lossy().replace('/', "\\");

        let mut args = vec![self.log_flag.clone(), path];
        args.extend(self.extra_args.iter().cloned());

        CommandSpec {
            program: self.program.clone(),
            args,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnixStrategy {
    program: String,
    log_flag: String,
    extra_args: Vec<String>,
}

impl UnixStrategy {
    pub fn from_config(cfg: &RunnerConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            log_flag: cfg.log_flag.clone(),
            extra_args: cfg.extra_args.clone(),
        }
    }
}

impl RunStrategy for UnixStrategy {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn command(&self, log_path: &Path) -> CommandSpec {
        let mut args = vec![
            self.log_flag.clone(),
            log_path.to_string_lossy().into_owned(),
        ];
        args.extend(self.extra_args.iter().cloned());

        CommandSpec {
            program: self.program.clone(),
            args,
        }
    }
}

/// Pick the run strategy for this process.
pub fn select(cfg: &RunnerConfig) -> Arc<dyn RunStrategy> {
    let windows = match cfg.platform {
        PlatformChoice::Auto => cfg!(windows),
        PlatformChoice::Windows => true,
        PlatformChoice::Unix => false,
    };

    if windows {
        Arc::new(WindowsStrategy::from_config(cfg))
    } else {
        Arc::new(UnixStrategy::from_config(cfg))
    }
}
