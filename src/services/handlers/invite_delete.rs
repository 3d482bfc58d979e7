//! Removes an invite entry from its venture's listing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::KeyStore;
use crate::services::handlers::Handler;

pub struct InviteDelete {
    store: Arc<dyn KeyStore>,
}

impl InviteDelete {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for InviteDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "invite"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        let iid = task.require_score(metadata::INVITE_ID)?;
        let vid = task.require(metadata::VENTURE_ID)?;

        info!(venture = vid, "deleting invite resource");

        self.store
            .sorted_delete_score(&key::invite_list(vid), iid)
            .await?;

        info!(venture = vid, "deleted invite resource");

        Ok(())
    }
}
