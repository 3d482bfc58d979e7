//! Cascading update deletion.
//!
//! Drops the update from its timeline's listing, then walks the message
//! lists under the update and emits a subordinate message delete per
//! stored member.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::{HandlerError, StoreError};
use crate::domain::models::{key, metadata, schema, Task};
use crate::domain::ports::{KeyStore, TaskBroker};
use crate::services::fanout::fan_out;
use crate::services::handlers::Handler;

pub struct UpdateDelete {
    store: Arc<dyn KeyStore>,
    broker: Arc<dyn TaskBroker>,
    timeout: Duration,
}

impl UpdateDelete {
    pub fn new(store: Arc<dyn KeyStore>, broker: Arc<dyn TaskBroker>, timeout: Duration) -> Self {
        Self {
            store,
            broker,
            timeout,
        }
    }

    async fn delete_element(&self, task: &Task) -> Result<(), HandlerError> {
        let uid = task.require_score(metadata::UPDATE_ID)?;
        let tid = task.require(metadata::TIMELINE_ID)?;
        let vid = task.require(metadata::VENTURE_ID)?;

        self.store
            .sorted_delete_score(&key::update_list(vid, tid), uid)
            .await?;

        Ok(())
    }

    async fn delete_keys(&self, task: &Task) -> Result<(), HandlerError> {
        let vid = task.require(metadata::VENTURE_ID)?;
        let tid = task.require(metadata::TIMELINE_ID)?;
        let uid = task.require(metadata::UPDATE_ID)?;

        let pattern = key::message_pattern(vid, tid, uid);
        let walker = {
            let store = self.store.clone();
            move |sink| async move { store.walk(&pattern, sink).await }
        };

        fan_out(walker, self.timeout, |found| {
            let store = self.store.clone();
            let broker = self.broker.clone();
            async move {
                for member in store.sorted_search_order(&found, 0, -1).await? {
                    let message: schema::Message =
                        serde_json::from_str(&member).map_err(|e| StoreError::Decode {
                            key: found.clone(),
                            source: e,
                        })?;

                    let child = Task::new(message.obj.metadata).child("delete", "message");
                    broker.create(&child).await?;
                }
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl Handler for UpdateDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "update"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        info!("deleting update");

        self.delete_element(task).await?;
        self.delete_keys(task).await?;

        info!("deleted update");

        Ok(())
    }
}
