//! Key-value store port.
//!
//! Simple key/value elements, sorted sets scored by numeric resource
//! IDs, and a streaming key-pattern walker.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::error::StoreError;

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// The value under `key`, if present.
    async fn simple_search(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn simple_create(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing an absent element is not an error.
    async fn simple_delete(&self, key: &str) -> Result<(), StoreError>;

    /// Members of the sorted set under `key` between the given ranks,
    /// in ascending score order. `-1` addresses the last rank.
    async fn sorted_search_order(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError>;

    /// Members whose score falls within `[min, max]`.
    async fn sorted_search_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<String>, StoreError>;

    /// The rank of `member` within the sorted set, if present.
    async fn sorted_search_index(
        &self,
        key: &str,
        member: &str,
    ) -> Result<Option<usize>, StoreError>;

    /// Remove the member scored exactly `score`. Idempotent.
    async fn sorted_delete_score(&self, key: &str, score: f64) -> Result<(), StoreError>;

    /// Remove the whole sorted set. Idempotent.
    async fn sorted_delete_clean(&self, key: &str) -> Result<(), StoreError>;

    /// Stream every key matching `pattern` into `sink`. A closed sink is
    /// cancellation, not an error; the walker stops and returns `Ok`.
    async fn walk(&self, pattern: &str, sink: mpsc::Sender<String>) -> Result<(), StoreError>;
}
