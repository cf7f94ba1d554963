// src/logs.rs

//! Where each job writes its chef log, and how old logs are cleaned up.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::LogsConfig;
use crate::errors::Result;
use crate::types::JobId;

/// Maps a job id to the file its process should log into.
pub trait LogPathResolver: Send + Sync + Debug {
    fn log_path(&self, job: &JobId) -> PathBuf;
}

/// Resolver that keeps one file per job in a single directory:
/// `<directory>/<job>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirLogPathResolver {
    directory: PathBuf,
    extension: String,
}

impl DirLogPathResolver {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into().trim().trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(cfg: &LogsConfig) -> Self {
        Self::new(cfg.directory.clone(), cfg.extension.clone())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the log directory (and parents) if missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("creating log directory {:?}", self.directory))?;
        Ok(())
    }

    /// Delete the oldest log files so that at most `keep` remain.
    ///
    /// Only files carrying the configured extension are considered. `keep == 0`
    /// disables pruning. Returns how many files were removed.
    pub fn prune(&self, keep: usize) -> Result<usize> {
        if keep == 0 || !self.directory.is_dir() {
            return Ok(0);
        }

        let mut logs: Vec<(SystemTime, PathBuf)> = Vec::new();
        let entries = fs::read_dir(&self.directory)
            .with_context(|| format!("reading log directory {:?}", self.directory))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !self.is_log_file(&path) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            logs.push((modified, path));
        }

        if logs.len() <= keep {
            return Ok(0);
        }

        // Newest first; ties broken by name so the order is stable.
        logs.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        let mut removed = 0;
        for (_, path) in logs.into_iter().skip(keep) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "pruned old chef log");
                    removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to prune chef log");
                }
            }
        }

        Ok(removed)
    }

    fn is_log_file(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == self.extension)
    }
}

impl LogPathResolver for DirLogPathResolver {
    fn log_path(&self, job: &JobId) -> PathBuf {
        self.directory
            .join(format!("{}.{}", job.as_str(), self.extension))
    }
}
