//! Cross-cutting role cleanup.
//!
//! Matches any delete of a resource that can carry a role list and
//! cleans the whole list. The target kind defaults to the task resource
//! and may be overridden by the resource-kind label, e.g. for the role
//! task a user delete emits.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::KeyStore;
use crate::services::handlers::Handler;

const RESOURCES: [&str; 7] = [
    "invite",
    "message",
    "role",
    "timeline",
    "update",
    "user",
    "venture",
];

pub struct RoleDelete {
    store: Arc<dyn KeyStore>,
}

impl RoleDelete {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for RoleDelete {
    fn filter(&self, task: &Task) -> bool {
        RESOURCES.iter().any(|r| {
            task.matches(&[
                (metadata::TASK_ACTION, "delete"),
                (metadata::TASK_RESOURCE, r),
            ])
        })
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        let resource = task.require(metadata::TASK_RESOURCE)?;
        let kind = task.get(metadata::RESOURCE_KIND).unwrap_or(resource);

        // Resources without an addressable ID have no role list to clean.
        let Some(id) = metadata::id_label(kind).and_then(|label| task.get(label)) else {
            return Ok(());
        };

        info!(kind, "deleting role resource");

        self.store
            .sorted_delete_clean(&key::role_list(kind, id))
            .await?;

        info!(kind, "deleted role resource");

        Ok(())
    }
}
