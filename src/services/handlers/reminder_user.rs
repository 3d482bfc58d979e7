//! Per-user weekly reminder mail.
//!
//! Collects the updates of the last week across every venture the user
//! is a subject of, renders the rich-text bodies to HTML, and sends one
//! templated mail. Users without the weekly-update feature flag, without
//! a mail address, or without recent updates are skipped quietly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::error::{HandlerError, MailError, StoreError};
use crate::domain::models::{key, metadata, schema, Nodes, Task};
use crate::domain::ports::{KeyStore, MailRequest, Mailer};
use crate::services::handlers::Handler;

/// Window of updates included in the reminder.
const LOOKBACK_HOURS: i64 = 168;

/// Provider error code for an inactive recipient, treated as success.
const INACTIVE_RECIPIENT: i64 = 406;

/// Static sender identity and template selection.
#[derive(Clone, Debug)]
pub struct ReminderSettings {
    pub from: String,
    pub template_alias: String,
}

pub struct ReminderUser {
    store: Arc<dyn KeyStore>,
    mailer: Arc<dyn Mailer>,
    settings: ReminderSettings,
}

impl ReminderUser {
    pub fn new(
        store: Arc<dyn KeyStore>,
        mailer: Arc<dyn Mailer>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            settings,
        }
    }

    async fn create_reminder(&self, task: &Task, now: DateTime<Utc>) -> Result<(), HandlerError> {
        let uid = task.require(metadata::USER_ID)?;

        let Some(raw) = self.store.simple_search(&key::user(uid)).await? else {
            debug!(user = uid, "user record gone, skipping reminder");
            return Ok(());
        };
        let user: schema::User = serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
            key: key::user(uid),
            source: e,
        })?;

        let opted_in = user
            .obj
            .metadata
            .get(metadata::FEATURE_WEEKLY_UPDATE)
            .is_some_and(|v| v == "true");
        if !opted_in || user.obj.property.mail.is_empty() {
            debug!(user = uid, "user not eligible for weekly reminder");
            return Ok(());
        }

        let cutoff = now - Duration::hours(LOOKBACK_HOURS);
        let model = self.render_model(uid, cutoff, now).await?;
        let Some(model) = model else {
            debug!(user = uid, "no recent updates, skipping reminder");
            return Ok(());
        };

        let request = MailRequest {
            template_alias: self.settings.template_alias.clone(),
            model,
            from: self.settings.from.clone(),
            to: user.obj.property.mail.clone(),
            track_opens: true,
        };

        let receipt = self.mailer.send_templated(&request).await?;
        if receipt.message == "OK" || receipt.error_code == INACTIVE_RECIPIENT {
            return Ok(());
        }

        Err(MailError::Delivery {
            code: receipt.error_code,
            message: receipt.message,
        }
        .into())
    }

    /// The template model grouped by venture, or `None` when the window
    /// holds no updates.
    async fn render_model(
        &self,
        uid: &str,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<Value>, HandlerError> {
        let cutoff_score = cutoff.timestamp_nanos_opt().unwrap_or(i64::MAX) as f64;

        let mut ventures = Vec::new();
        let mut total = 0usize;

        let subject_list = key::subject(uid, "venture");
        for vid in self.store.sorted_search_order(&subject_list, 0, -1).await? {
            let Some(raw) = self.store.simple_search(&key::venture(&vid)).await? else {
                continue;
            };
            let venture: schema::Venture =
                serde_json::from_str(&raw).map_err(|e| StoreError::Decode {
                    key: key::venture(&vid),
                    source: e,
                })?;

            let name = venture.obj.property.name;
            let slug = name.to_lowercase().replace(' ', "");

            let mut updates = Vec::new();
            let timeline_list = key::timeline_list(&vid);
            for member in self
                .store
                .sorted_search_order(&timeline_list, 0, -1)
                .await?
            {
                let timeline: schema::Timeline =
                    serde_json::from_str(&member).map_err(|e| StoreError::Decode {
                        key: timeline_list.clone(),
                        source: e,
                    })?;
                let Some(tid) = timeline.obj.metadata.get(metadata::TIMELINE_ID) else {
                    continue;
                };

                let update_list = key::update_list(&vid, tid);
                for member in self
                    .store
                    .sorted_search_score(&update_list, cutoff_score, f64::MAX)
                    .await?
                {
                    let update: schema::Update =
                        serde_json::from_str(&member).map_err(|e| StoreError::Decode {
                            key: update_list.clone(),
                            source: e,
                        })?;

                    updates.push(self.update_model(&update, &slug, now).await);
                }
            }

            if updates.is_empty() {
                continue;
            }

            total += updates.len();
            ventures.push(json!({
                "name": name,
                "slug": slug,
                "updates": updates,
            }));
        }

        if total == 0 {
            return Ok(None);
        }

        Ok(Some(json!({
            "ventures": ventures,
            "updateCount": total,
            "plural": total != 1,
        })))
    }

    async fn update_model(&self, update: &schema::Update, slug: &str, now: DateTime<Utc>) -> Value {
        let body = match serde_json::from_str::<Nodes>(&update.obj.property.text) {
            Ok(nodes) => nodes.to_html(&mail_styles()),
            // Legacy plain-text bodies predate the rich-text editor.
            Err(_) => update.obj.property.text.clone(),
        };

        let author = match update.obj.metadata.get(metadata::USER_ID) {
            Some(aid) => self.author_name(aid).await,
            None => String::new(),
        };

        let relative = update
            .obj
            .metadata
            .get(metadata::UPDATE_ID)
            .and_then(|id| id.parse::<i64>().ok())
            .map(|ns| relative_time(now, ns))
            .unwrap_or_default();

        json!({
            "title": update.obj.property.head,
            "body": body,
            "authorName": author,
            "relativeTime": relative,
            "path": format!("/{slug}"),
        })
    }

    /// Best effort; a reminder is still worth sending when the author's
    /// record is gone.
    async fn author_name(&self, aid: &str) -> String {
        let Ok(Some(raw)) = self.store.simple_search(&key::user(aid)).await else {
            return String::new();
        };

        serde_json::from_str::<schema::User>(&raw)
            .map(|u| u.obj.property.name)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Handler for ReminderUser {
    fn filter(&self, task: &Task) -> bool {
        task.matches(&[
            (metadata::TASK_ACTION, "create"),
            (metadata::TASK_AUDIENCE, "user"),
            (metadata::TASK_RESOURCE, "reminder"),
        ])
    }

    async fn ensure(&self, task: &Task) -> Result<(), HandlerError> {
        info!("creating user reminder");

        self.create_reminder(task, Utc::now()).await?;

        info!("created user reminder");

        Ok(())
    }
}

fn mail_styles() -> HashMap<String, String> {
    [
        ("title", "margin:0 0 8px 0;font-size:16px"),
        ("paragraph", "margin:0 0 12px 0"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Coarse age of an update, from its nanosecond ID.
fn relative_time(now: DateTime<Utc>, then_ns: i64) -> String {
    let then = DateTime::<Utc>::from_timestamp_nanos(then_ns);
    let days = (now - then).num_days();

    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}
