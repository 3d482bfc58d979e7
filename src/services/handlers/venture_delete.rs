//! Cascading venture deletion.
//!
//! Emits a subordinate timeline delete per child timeline, cleans the
//! venture's role list, and removes the venture element itself.
//! Children must be gone or queued before the parent index is removed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::{HandlerError, StoreError};
use crate::domain::models::{key, metadata, schema, Task};
use crate::domain::ports::{KeyStore, TaskBroker};
use crate::services::handlers::Handler;

pub struct VentureDelete {
    store: Arc<dyn KeyStore>,
    broker: Arc<dyn TaskBroker>,
}

impl VentureDelete {
    pub fn new(store: Arc<dyn KeyStore>, broker: Arc<dyn TaskBroker>) -> Self {
        Self { store, broker }
    }

    async fn delete_timelines(&self, task: &Task) -> Result<(), HandlerError> {
        let vid = task.require(metadata::VENTURE_ID)?;
        let list = key::timeline_list(vid);

        for member in self.store.sorted_search_order(&list, 0, -1).await? {
            let timeline: schema::Timeline =
                serde_json::from_str(&member).map_err(|e| StoreError::Decode {
                    key: list.clone(),
                    source: e,
                })?;

            let child = Task::new(timeline.obj.metadata).child("delete", "timeline");
            self.broker.create(&child).await?;
        }

        Ok(())
    }

    async fn delete_roles(&self, task: &Task) -> Result<(), HandlerError> {
        let vid = task.require(metadata::VENTURE_ID)?;

        self.store
            .sorted_delete_clean(&key::role_list("venture", vid))
            .await?;

        Ok(())
    }

    async fn delete_venture(&self, task: &Task) -> Result<(), HandlerError> {
        let vid = task.require(metadata::VENTURE_ID)?;

        self.store.simple_delete(&key::venture(vid)).await?;

        Ok(())
    }
}

#[async_trait]
impl Handler for VentureDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "venture"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        info!("deleting venture resource");

        self.delete_timelines(task).await?;
        self.delete_roles(task).await?;
        self.delete_venture(task).await?;

        info!("deleted venture resource");

        Ok(())
    }
}
