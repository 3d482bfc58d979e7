//! Cascading user deletion.
//!
//! Removes the user's claim binding and record, and emits a subordinate
//! role delete so the cross-cutting role cleanup runs against the user's
//! role list. Subject memberships are cleaned by the subject handler,
//! which matches the same task.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::error::HandlerError;
use crate::domain::models::{key, metadata, Task};
use crate::domain::ports::{KeyStore, TaskBroker};
use crate::services::handlers::Handler;

pub struct UserDelete {
    store: Arc<dyn KeyStore>,
    broker: Arc<dyn TaskBroker>,
}

impl UserDelete {
    pub fn new(store: Arc<dyn KeyStore>, broker: Arc<dyn TaskBroker>) -> Self {
        Self { store, broker }
    }

    async fn delete_association(&self, task: &Task) -> Result<(), HandlerError> {
        let uid = task.require(metadata::USER_ID)?;

        self.store.simple_delete(&key::claim(uid)).await?;

        Ok(())
    }

    async fn delete_roles(&self, task: &Task) -> Result<(), HandlerError> {
        let mut child = task.child("delete", "role");
        child.set(metadata::RESOURCE_KIND, "user");

        self.broker.create(&child).await?;

        Ok(())
    }

    async fn delete_user(&self, task: &Task) -> Result<(), HandlerError> {
        let uid = task.require(metadata::USER_ID)?;

        self.store.simple_delete(&key::user(uid)).await?;

        Ok(())
    }
}

#[async_trait]
impl Handler for UserDelete {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "delete"),
            (metadata::TASK_RESOURCE, "user"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        info!("deleting user resource");

        self.delete_association(task).await?;
        self.delete_roles(task).await?;
        self.delete_user(task).await?;

        info!("deleted user resource");

        Ok(())
    }
}
