//! Redis-backed key-value store.

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::mpsc;

use crate::domain::error::StoreError;
use crate::domain::ports::KeyStore;
use crate::infrastructure::redis::store_error;

#[derive(Clone)]
pub struct RedisStore {
    con: redis::aio::ConnectionManager,
}

impl RedisStore {
    pub fn new(con: redis::aio::ConnectionManager) -> Self {
        Self { con }
    }
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn simple_search(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.con.clone();

        con.get(key).await.map_err(store_error)
    }

    async fn simple_create(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut con = self.con.clone();

        let _: () = con.set(key, value).await.map_err(store_error)?;
        Ok(())
    }

    async fn simple_delete(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.con.clone();

        let _: () = con.del(key).await.map_err(store_error)?;
        Ok(())
    }

    async fn sorted_search_order(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let mut con = self.con.clone();

        con.zrange(key, start, stop).await.map_err(store_error)
    }

    async fn sorted_search_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<String>, StoreError> {
        let mut con = self.con.clone();

        con.zrangebyscore(key, min, max).await.map_err(store_error)
    }

    async fn sorted_search_index(
        &self,
        key: &str,
        member: &str,
    ) -> Result<Option<usize>, StoreError> {
        let mut con = self.con.clone();

        let rank: Option<isize> = con.zrank(key, member).await.map_err(store_error)?;
        Ok(rank.map(|r| r.unsigned_abs()))
    }

    async fn sorted_delete_score(&self, key: &str, score: f64) -> Result<(), StoreError> {
        let mut con = self.con.clone();

        let _: () = con
            .zrembyscore(key, score, score)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn sorted_delete_clean(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.con.clone();

        let _: () = con.del(key).await.map_err(store_error)?;
        Ok(())
    }

    async fn walk(&self, pattern: &str, sink: mpsc::Sender<String>) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut con)
                .await
                .map_err(store_error)?;

            for key in keys {
                if sink.send(key).await.is_err() {
                    // Consumer hung up; treat as cancellation.
                    return Ok(());
                }
            }

            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }
}
