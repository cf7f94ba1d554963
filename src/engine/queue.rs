// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use crate::types::JobId;

/// FIFO of jobs waiting for a free execution slot.
///
/// `max_len` is clamped to at least 1.
#[derive(Debug)]
pub struct JobQueue {
    max_len: usize,
    pending: VecDeque<JobId>,
}

impl JobQueue {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            pending: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.max_len
    }

    /// Append a job; hands it back if there is no room.
    pub fn push(&mut self, job: JobId) -> Result<(), JobId> {
        if self.is_full() {
            return Err(job);
        }
        debug!(job = %job, position = self.pending.len(), "job queued");
        self.pending.push_back(job);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<JobId> {
        self.pending.pop_front()
    }
}
