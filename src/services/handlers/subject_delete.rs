//! Cross-cutting subject membership cleanup.
//!
//! Matches any delete of a resource that subjects can be linked to and
//! removes every membership sorted-set of the affected subject by
//! walking the subject key pattern.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::KeyStore;
use crate::services::fanout::fan_out;
use crate::services::handlers::Handler;

const RESOURCES: [&str; 6] = ["invite", "message", "timeline", "update", "user", "venture"];

pub struct SubjectDelete {
    store: Arc<dyn KeyStore>,
    timeout: Duration,
}

impl SubjectDelete {
    pub fn new(store: Arc<dyn KeyStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

#[async_trait]
impl Handler for SubjectDelete {
    fn filter(&self, task: &Task) -> bool {
        RESOURCES.iter().any(|r| {
            task.matches(&[
                (metadata::TASK_ACTION, "delete"),
                (metadata::TASK_RESOURCE, r),
            ])
        })
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        // Deletes without an affected subject have nothing to clean.
        let Some(sid) = task
            .get(metadata::SUBJECT_ID)
            .or_else(|| task.get(metadata::USER_ID))
        else {
            return Ok(());
        };

        info!(subject = sid, "deleting subject associations");

        let pattern = key::subject_pattern(sid);
        let walker = {
            let store = self.store.clone();
            move |sink| async move { store.walk(&pattern, sink).await }
        };

        fan_out(walker, self.timeout, |found| {
            let store = self.store.clone();
            async move {
                store.sorted_delete_clean(&found).await?;
                Ok(())
            }
        })
        .await?;

        info!(subject = sid, "deleted subject associations");

        Ok(())
    }
}
