//! Task handlers.
//!
//! Every handler exposes a pure metadata predicate and an idempotent
//! `ensure`. Two execution shapes recur: direct store mutation (a
//! bounded set of delete calls), and cursor-driven fan-out over a
//! streamed key space with bounded completion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::error::HandlerError;
use crate::domain::models::Task;
use crate::domain::ports::{KeyStore, Mailer, TaskBroker};

pub mod audience_delete;
pub mod invite_delete;
pub mod message_delete;
pub mod reminder_user;
pub mod reminder_weekly;
pub mod role_delete;
pub mod subject_delete;
pub mod timeline_delete;
pub mod update_delete;
pub mod user_delete;
pub mod venture_delete;

pub use reminder_user::ReminderSettings;

#[async_trait]
pub trait Handler: Send + Sync {
    /// Pure predicate over the task's metadata; no side effects.
    fn filter(&self, task: &Task) -> bool;

    /// Perform the work. Idempotent; safe to re-run after partial
    /// progress or re-delivery.
    async fn ensure(&self, task: &Task) -> Result<(), HandlerError>;
}

/// The full handler list in registration order. Dispatch honors this
/// order within a tick.
pub fn registry(
    store: Arc<dyn KeyStore>,
    broker: Arc<dyn TaskBroker>,
    mailer: Arc<dyn Mailer>,
    timeout: Duration,
    reminder: ReminderSettings,
) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(audience_delete::AudienceDelete::new(store.clone())),
        Arc::new(invite_delete::InviteDelete::new(store.clone())),
        Arc::new(message_delete::MessageDelete::new(store.clone())),
        Arc::new(reminder_weekly::ReminderWeekly::new(
            store.clone(),
            broker.clone(),
            timeout,
        )),
        Arc::new(reminder_user::ReminderUser::new(
            store.clone(),
            mailer,
            reminder,
        )),
        Arc::new(role_delete::RoleDelete::new(store.clone())),
        Arc::new(subject_delete::SubjectDelete::new(store.clone(), timeout)),
        Arc::new(timeline_delete::TimelineDelete::new(
            store.clone(),
            broker.clone(),
            timeout,
        )),
        Arc::new(update_delete::UpdateDelete::new(
            store.clone(),
            broker.clone(),
            timeout,
        )),
        Arc::new(user_delete::UserDelete::new(store.clone(), broker.clone())),
        Arc::new(venture_delete::VentureDelete::new(store, broker)),
    ]
}
