// src/engine/handle.rs

use tokio::sync::{mpsc, oneshot};

use crate::errors::{ChefRunnerError, Result};
use crate::types::JobId;

use super::table::JobRecord;
use super::RuntimeEvent;

/// Cloneable client for a running dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<RuntimeEvent>,
}

impl DispatcherHandle {
    pub fn new(tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { tx }
    }

    /// Submit a job. Whether it started, queued or got rejected is visible
    /// through [`status`](Self::status).
    pub async fn submit(&self, job: JobId) -> Result<()> {
        self.send(RuntimeEvent::JobSubmitted { job }).await
    }

    pub async fn status(&self, job: JobId) -> Result<Option<JobRecord>> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::StatusRequested { job, reply }).await?;
        rx.await.map_err(|_| ChefRunnerError::ChannelClosed)
    }

    pub async fn list(&self) -> Result<Vec<JobRecord>> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::ListRequested { reply }).await?;
        rx.await.map_err(|_| ChefRunnerError::ChannelClosed)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(RuntimeEvent::ShutdownRequested).await
    }

    async fn send(&self, event: RuntimeEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ChefRunnerError::ChannelClosed)
    }
}
