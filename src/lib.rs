// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod logs;
pub mod request;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::engine::{CoreDispatcher, JobRecord, JobState, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::RealExecutorBackend;
use crate::request::ChefRunner;
use crate::types::{ExitCode, JobId};

/// High-level entry point used by `main.rs`.
///
/// Loads config, builds the chef runner and the dispatcher, submits every
/// job from the command line and waits until they have all finished.
/// Returns the exit status for the whole batch.
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let mut cfg = load_or_default(args.config.as_deref().map(Path::new))?;
    if let Some(n) = args.max_concurrent {
        anyhow::ensure!(n >= 1, "--max-concurrent must be >= 1");
        cfg.dispatcher.max_concurrent = n;
    }

    let jobs = collect_jobs(&args.jobs)?;
    let runner = Arc::new(ChefRunner::from_config(&cfg));

    if args.dry_run {
        print_dry_run(&cfg, &runner, &jobs);
        return Ok(0);
    }

    runner.prepare_logs()?;
    runner.prune_logs();

    // Sized so every submission fits before the runtime starts reading.
    let capacity = 64 + jobs.len();
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(capacity);

    let executor = RealExecutorBackend::new(
        Arc::clone(&runner),
        cfg.dispatcher.job_timeout,
        rt_tx.clone(),
    );

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(count = jobs.len(), strategy = runner.strategy().name(), "submitting jobs");
    for job in jobs {
        rt_tx.send(RuntimeEvent::JobSubmitted { job }).await?;
    }

    let options = RuntimeOptions {
        exit_when_idle: true,
        retain_output: cfg.dispatcher.retain_output,
    };
    let core = CoreDispatcher::new(
        cfg.dispatcher.max_concurrent,
        cfg.dispatcher.queue_length,
        options,
    );

    let records = Runtime::new(core, rt_rx, executor).run().await?;
    // Every job has been torn down by now, so no log is still being written.
    runner.prune_logs();
    print_summary(&records);

    Ok(batch_exit_code(&records))
}

/// Parse job ids from the command line, generating one if none were given.
fn collect_jobs(raw: &[String]) -> Result<Vec<JobId>> {
    if raw.is_empty() {
        return Ok(vec![JobId::generate()]);
    }
    raw.iter()
        .map(|s| JobId::new(s.as_str()).map_err(anyhow::Error::from))
        .collect()
}

/// First non-zero status in submission order; `1` for a job that never
/// produced an exit code; `0` when everything succeeded.
pub fn batch_exit_code(records: &[JobRecord]) -> ExitCode {
    for rec in records {
        match &rec.state {
            JobState::Completed { exit_code: 0 } => {}
            JobState::Completed { exit_code } => return *exit_code,
            _ => return 1,
        }
    }
    0
}

fn print_summary(records: &[JobRecord]) {
    for rec in records {
        match &rec.log_path {
            Some(log) => println!("{}  {}  (log: {})", rec.id, rec.state, log.display()),
            None => println!("{}  {}", rec.id, rec.state),
        }
    }
}

fn print_dry_run(cfg: &ConfigFile, runner: &ChefRunner, jobs: &[JobId]) {
    println!("chefrunner dry-run");
    println!("  runner.strategy = {}", runner.strategy().name());
    println!("  runner.platform = {}", cfg.runner.platform);
    println!("  logs.directory = {}", cfg.logs.directory.display());
    println!("  logs.keep = {}", cfg.logs.keep);
    println!("  dispatcher.max_concurrent = {}", cfg.dispatcher.max_concurrent);
    println!("  dispatcher.queue_length = {}", cfg.dispatcher.queue_length);
    if let Some(timeout) = cfg.dispatcher.job_timeout {
        println!("  dispatcher.job_timeout = {:?}", timeout);
    }
    println!();

    println!("jobs ({}):", jobs.len());
    for job in jobs {
        let log_path = runner.resolver().log_path(job);
        println!("  - {job}");
        println!("      cmd: {}", runner.strategy().command(&log_path));
    }
}
