//! Weekly reminder fan-out.
//!
//! Consumes the scheduler's weekly task and walks the user keyspace,
//! emitting one per-user reminder task per element. The per-user tasks
//! carry the actual mail work so a partial fan-out retries in isolation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::{KeyStore, TaskBroker};
use crate::services::fanout::fan_out;
use crate::services::handlers::Handler;

pub struct ReminderWeekly {
    store: Arc<dyn KeyStore>,
    broker: Arc<dyn TaskBroker>,
    timeout: Duration,
}

impl ReminderWeekly {
    pub fn new(store: Arc<dyn KeyStore>, broker: Arc<dyn TaskBroker>, timeout: Duration) -> Self {
        Self {
            store,
            broker,
            timeout,
        }
    }
}

#[async_trait]
impl Handler for ReminderWeekly {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "create"),
            (metadata::TASK_INTERVAL, "weekly"),
            (metadata::TASK_RESOURCE, "reminder"),
        ])
    }

    async fn ensure(&self, _task: &Task) -> Result<(), HandlerError> {
        info!("creating weekly reminder");

        let walker = {
            let store = self.store.clone();
            move |sink| async move { store.walk(key::USER_PATTERN, sink).await }
        };

        fan_out(walker, self.timeout, |found| {
            let broker = self.broker.clone();
            async move {
                // A key without a user ID is skipped, not a failure.
                let Some(uid) = key::user_id(&found) else {
                    return Ok(());
                };

                let mut child = Task::default();
                child.set(metadata::TASK_ACTION, "create");
                child.set(metadata::TASK_AUDIENCE, "user");
                child.set(metadata::TASK_RESOURCE, "reminder");
                child.set(metadata::USER_ID, uid);

                broker.create(&child).await?;
                Ok(())
            }
        })
        .await?;

        info!("created weekly reminder");

        Ok(())
    }
}
