//! Task broker port.
//!
//! A durable queue with at-least-once delivery. Searching leases the
//! next runnable task; a leased task that is neither deleted nor
//! re-leased becomes runnable again once its lease expires.

use async_trait::async_trait;

use crate::domain::error::BrokerError;
use crate::domain::models::Task;

#[async_trait]
pub trait TaskBroker: Send + Sync {
    /// Persist a new task.
    async fn create(&self, task: &Task) -> Result<(), BrokerError>;

    /// Lease the next runnable task. `Ok(None)` means the queue holds
    /// no runnable task right now, which is not an error.
    async fn search(&self) -> Result<Option<Task>, BrokerError>;

    /// Return leased-but-expired tasks to the runnable state.
    async fn expire(&self) -> Result<(), BrokerError>;

    /// Remove a completed task.
    async fn delete(&self, task: &Task) -> Result<(), BrokerError>;
}
