// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`process`] runs a program to completion and captures its output.
//! - [`strategy`] builds the chef command line for the host platform.
//! - [`backend`] is the `ExecutorBackend` seam the dispatcher runtime uses.
//! - [`executor_loop`] and [`job_runner`] carry out started jobs in
//!   production.

pub mod backend;
pub mod executor_loop;
pub mod job_runner;
pub mod process;
pub mod strategy;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use strategy::{CommandSpec, RunStrategy, UnixStrategy, WindowsStrategy};
