//! Removes an audience entry from its venture's listing.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::KeyStore;
use crate::services::handlers::Handler;

pub struct AudienceDelete {
    store: Arc<dyn KeyStore>,
}

impl AudienceDelete {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for AudienceDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "audience"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        let aid = task.require_score(metadata::AUDIENCE_ID)?;
        let vid = task.require(metadata::VENTURE_ID)?;

        info!(venture = vid, "deleting audience resource");

        self.store
            .sorted_delete_score(&key::audience_list(vid), aid)
            .await?;

        info!(venture = vid, "deleted audience resource");

        Ok(())
    }
}
