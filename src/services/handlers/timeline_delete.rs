//! Cascading timeline deletion.
//!
//! Drops the timeline from its venture's listing, then walks every
//! update list under the timeline and emits a subordinate update delete
//! per stored member. Shifting the per-update work back through the
//! queue isolates retries when a timeline carries many updates.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::{HandlerError, StoreError};
use crate::domain::models::{key, metadata, schema, Task};
use crate::domain::ports::{KeyStore, TaskBroker};
use crate::services::fanout::fan_out;
use crate::services::handlers::Handler;

pub struct TimelineDelete {
    store: Arc<dyn KeyStore>,
    broker: Arc<dyn TaskBroker>,
    timeout: Duration,
}

impl TimelineDelete {
    pub fn new(store: Arc<dyn KeyStore>, broker: Arc<dyn TaskBroker>, timeout: Duration) -> Self {
        Self {
            store,
            broker,
            timeout,
        }
    }

    async fn delete_element(&self, task: &Task) -> Result<(), HandlerError> {
        let tid = task.require_score(metadata::TIMELINE_ID)?;
        let vid = task.require(metadata::VENTURE_ID)?;

        self.store
            .sorted_delete_score(&key::timeline_list(vid), tid)
            .await?;

        Ok(())
    }

    async fn delete_keys(&self, task: &Task) -> Result<(), HandlerError> {
        let vid = task.require(metadata::VENTURE_ID)?;
        let tid = task.require(metadata::TIMELINE_ID)?;

        let pattern = key::update_pattern(vid, tid);
        let walker = {
            let store = self.store.clone();
            move |sink| async move { store.walk(&pattern, sink).await }
        };

        fan_out(walker, self.timeout, |found| {
            let store = self.store.clone();
            let broker = self.broker.clone();
            async move {
                for member in store.sorted_search_order(&found, 0, -1).await? {
                    let update: schema::Update =
                        serde_json::from_str(&member).map_err(|e| StoreError::Decode {
                            key: found.clone(),
                            source: e,
                        })?;

                    let child = Task::new(update.obj.metadata).child("delete", "update");
                    broker.create(&child).await?;
                }
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl Handler for TimelineDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "timeline"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        info!("deleting timeline");

        self.delete_element(task).await?;
        self.delete_keys(task).await?;

        info!("deleted timeline");

        Ok(())
    }
}
