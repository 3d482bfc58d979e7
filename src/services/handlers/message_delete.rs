//! Removes a message entry from its update's listing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::KeyStore;
use crate::services::handlers::Handler;

pub struct MessageDelete {
    store: Arc<dyn KeyStore>,
}

impl MessageDelete {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for MessageDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "message"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        let mid = task.require_score(metadata::MESSAGE_ID)?;
        let tid = task.require(metadata::TIMELINE_ID)?;
        let uid = task.require(metadata::UPDATE_ID)?;
        let vid = task.require(metadata::VENTURE_ID)?;

        info!(venture = vid, update = uid, "deleting message resource");

        self.store
            .sorted_delete_score(&key::message_list(vid, tid, uid), mid)
            .await?;

        info!(venture = vid, update = uid, "deleted message resource");

        Ok(())
    }
}
