// src/engine/mod.rs

//! Job dispatcher.
//!
//! - [`core`] is the pure state machine: job table, pending queue and the
//!   concurrency bound. No Tokio, no IO.
//! - [`runtime`] is the async shell that feeds `RuntimeEvent`s into the core
//!   and carries out the resulting commands.
//! - [`handle`] is what callers use to talk to a running dispatcher.

use tokio::sync::oneshot;

use crate::types::JobId;

/// Options shared by the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Stop once nothing is running or queued (CLI batch mode).
    pub exit_when_idle: bool,
    /// Keep stdout/stderr of finished jobs in their records.
    pub retain_output: bool,
}

/// Events flowing into the dispatcher from callers and the executor.
#[derive(Debug)]
pub enum RuntimeEvent {
    JobSubmitted {
        job: JobId,
    },
    JobFinished {
        job: JobId,
        outcome: JobOutcome,
    },
    StatusRequested {
        job: JobId,
        reply: oneshot::Sender<Option<JobRecord>>,
    },
    ListRequested {
        reply: oneshot::Sender<Vec<JobRecord>>,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod handle;
pub mod queue;
pub mod runtime;
pub mod table;

pub use self::core::CoreDispatcher;
pub use event_handlers::{CoreCommand, CoreStep};
pub use handle::DispatcherHandle;
pub use queue::JobQueue;
pub use runtime::Runtime;
pub use table::{JobOutcome, JobRecord, JobState, JobTable};
