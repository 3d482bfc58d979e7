//! Redis-backed task broker.
//!
//! Tasks live as JSON members of one sorted set, scored (and identified)
//! by their creation time in nanoseconds. Leases live in a companion
//! hash mapping task ID to lease deadline. Searching leases the oldest
//! unleased task; expiring clears overdue leases so their tasks become
//! runnable again. Together with idempotent handlers this yields
//! at-least-once delivery without in-process locking.

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;

use crate::domain::error::BrokerError;
use crate::domain::models::{metadata, Task};
use crate::domain::ports::TaskBroker;
use crate::infrastructure::redis::broker_error;

const QUEUE_KEY: &str = "tsk:que";
const LEASE_KEY: &str = "tsk:lea";

#[derive(Clone)]
pub struct RedisBroker {
    con: redis::aio::ConnectionManager,
    expiry: std::time::Duration,
}

impl RedisBroker {
    pub fn new(con: redis::aio::ConnectionManager, expiry: std::time::Duration) -> Self {
        Self { con, expiry }
    }

    fn lease_deadline(&self) -> i64 {
        Utc::now().timestamp() + self.expiry.as_secs() as i64
    }
}

#[async_trait]
impl TaskBroker for RedisBroker {
    async fn create(&self, task: &Task) -> Result<(), BrokerError> {
        let mut con = self.con.clone();

        let mut tsk = task.clone();
        if tsk.get(metadata::TASK_ID).is_none() {
            let id = Utc::now().timestamp_nanos_opt().unwrap_or_default();
            tsk.set(metadata::TASK_ID, id.to_string());
        }

        let score: f64 = tsk
            .require_score(metadata::TASK_ID)
            .map_err(|e| BrokerError::Backend(e.to_string()))?;
        let member = serde_json::to_string(&tsk)?;

        let _: () = con
            .zadd(QUEUE_KEY, member, score)
            .await
            .map_err(broker_error)?;

        Ok(())
    }

    async fn search(&self) -> Result<Option<Task>, BrokerError> {
        let mut con = self.con.clone();

        let members: Vec<String> = con.zrange(QUEUE_KEY, 0, -1).await.map_err(broker_error)?;
        let leases: std::collections::HashMap<String, i64> =
            con.hgetall(LEASE_KEY).await.map_err(broker_error)?;

        for member in members {
            let tsk: Task = serde_json::from_str(&member)?;
            let Some(id) = tsk.get(metadata::TASK_ID) else {
                continue;
            };

            // Leased tasks stay invisible until expire() reclaims them.
            if leases.contains_key(id) {
                continue;
            }

            let _: () = con
                .hset(LEASE_KEY, id, self.lease_deadline())
                .await
                .map_err(broker_error)?;

            return Ok(Some(tsk));
        }

        Ok(None)
    }

    async fn expire(&self) -> Result<(), BrokerError> {
        let mut con = self.con.clone();

        let now = Utc::now().timestamp();
        let leases: std::collections::HashMap<String, i64> =
            con.hgetall(LEASE_KEY).await.map_err(broker_error)?;

        for (id, deadline) in leases {
            if deadline <= now {
                let _: () = con.hdel(LEASE_KEY, id).await.map_err(broker_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, task: &Task) -> Result<(), BrokerError> {
        let mut con = self.con.clone();

        let id = task
            .get(metadata::TASK_ID)
            .ok_or_else(|| BrokerError::Backend("task carries no broker id".to_string()))?;
        let score: f64 = id
            .parse()
            .map_err(|_| BrokerError::Backend("task id is not numeric".to_string()))?;

        let _: () = con
            .zrembyscore(QUEUE_KEY, score, score)
            .await
            .map_err(broker_error)?;
        let _: () = con.hdel(LEASE_KEY, id).await.map_err(broker_error)?;

        Ok(())
    }
}
