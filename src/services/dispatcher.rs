//! Handler registry and dispatch protocol.
//!
//! Matched handlers run in registration order. A handler leaving work
//! behind (incomplete execution or timeout) does not short-circuit its
//! siblings, but it does suppress the broker delete so the lease expires
//! and the task is retried. Any other handler error aborts the dispatch
//! and surfaces to the caller.

use std::sync::Arc;

use tracing::warn;

use crate::domain::error::{ConfigError, HandlerError};
use crate::domain::models::Task;
use crate::domain::ports::TaskBroker;
use crate::services::handlers::Handler;

/// How a dispatch concluded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Every matched handler finished; the task was deleted. Zero
    /// matches also completes by omission.
    Completed,
    /// At least one handler left work behind; the task stays with the
    /// broker until its lease expires.
    LeftForRetry,
}

pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Result<Self, ConfigError> {
        if handlers.is_empty() {
            return Err(ConfigError::Invalid(
                "dispatcher handlers must not be empty".to_string(),
            ));
        }

        Ok(Self { handlers })
    }

    pub async fn dispatch(
        &self,
        broker: &dyn TaskBroker,
        task: &Task,
    ) -> Result<Outcome, HandlerError> {
        let mut complete = true;

        for handler in &self.handlers {
            if !handler.filter(task) {
                continue;
            }

            match handler.ensure(task).await {
                Ok(()) => {}
                Err(e) if e.leaves_for_retry() => {
                    warn!(error = %e, "handler left task for retry");
                    complete = false;
                }
                Err(e) => return Err(e),
            }
        }

        if !complete {
            return Ok(Outcome::LeftForRetry);
        }

        broker.delete(task).await?;

        Ok(Outcome::Completed)
    }
}
