//! Weekly reminder scheduler.
//!
//! Emits at most one weekly reminder task per wall-clock week, gated on
//! a well-known stamp key. The emit-then-stamp order keeps the guarantee
//! at-least-once across crashes; the equality gate keeps it at-most-once
//! per window on a single leader. Downstream handlers tolerate the
//! duplicates a crash between the two steps can produce.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::{KeyStore, TaskBroker};

pub struct WeeklyScheduler {
    broker: Arc<dyn TaskBroker>,
    store: Arc<dyn KeyStore>,
}

impl WeeklyScheduler {
    pub fn new(broker: Arc<dyn TaskBroker>, store: Arc<dyn KeyStore>) -> Self {
        Self { broker, store }
    }

    /// Run one scheduling pass against the current wall clock.
    pub async fn ensure(&self) -> Result<(), HandlerError> {
        self.ensure_at(Utc::now()).await
    }

    /// Run one scheduling pass as of `now`, in UTC.
    pub async fn ensure_at(&self, now: DateTime<Utc>) -> Result<(), HandlerError> {
        if now.weekday() != Weekday::Mon || now.minute() != 0 {
            return Ok(());
        }

        let stamp = now.format("%d.%m.%Y").to_string();

        let current = self.store.simple_search(key::WEEKLY_STAMP).await?;
        if current.as_deref() == Some(stamp.as_str()) {
            return Ok(());
        }

        let mut tsk = Task::default();
        tsk.set(metadata::TASK_ACTION, "create");
        tsk.set(metadata::TASK_INTERVAL, "weekly");
        tsk.set(metadata::TASK_RESOURCE, "reminder");

        self.broker.create(&tsk).await?;
        self.store.simple_create(key::WEEKLY_STAMP, &stamp).await?;

        info!(stamp = %stamp, "emitted weekly reminder task");

        Ok(())
    }
}
