// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `chefrunner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chefrunner",
    version,
    about = "Dispatch chef-client runs and report their exit codes.",
    long_about = None
)]
pub struct CliArgs {
    /// Job ids to run. One id is generated when none are given.
    #[arg(value_name = "JOB_ID")]
    pub jobs: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `ChefRunner.toml` in the current directory if it exists,
    /// otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `[dispatcher].max_concurrent`.
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHEFRUNNER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved configuration and commands without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jobs_and_flags() {
        let args = CliArgs::try_parse_from([
            "chefrunner",
            "--max-concurrent",
            "3",
            "--log-level",
            "debug",
            "abc123",
            "def456",
        ])
        .unwrap();

        assert_eq!(args.jobs, vec!["abc123", "def456"]);
        assert_eq!(args.max_concurrent, Some(3));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(!args.dry_run);
        assert!(args.config.is_none());
    }
}
