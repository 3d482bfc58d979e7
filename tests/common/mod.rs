//! In-memory port fakes shared by the integration scenarios.

// Each test binary exercises a subset of these helpers.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use apiworker::domain::error::{BrokerError, MailError, StoreError};
use apiworker::domain::models::{metadata, Task};
use apiworker::domain::ports::{KeyStore, MailReceipt, MailRequest, Mailer, TaskBroker};

/// Wildcard key matching as the store's walker implements it: `*`
/// matches any run of characters.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}

#[derive(Default)]
struct StoreInner {
    simple: BTreeMap<String, String>,
    sorted: BTreeMap<String, Vec<(f64, String)>>,
}

/// Key-value store fake with an optional per-key walker delay for
/// timeout scenarios.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
    walk_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_walk_delay(delay: Duration) -> Self {
        Self {
            inner: Mutex::default(),
            walk_delay: Some(delay),
        }
    }

    pub fn seed_simple(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .simple
            .insert(key.to_string(), value.to_string());
    }

    pub fn seed_sorted(&self, key: &str, score: f64, member: &str) {
        let mut inner = self.inner.lock().unwrap();
        let list = inner.sorted.entry(key.to_string()).or_default();
        list.push((score, member.to_string()));
        list.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    pub fn simple_value(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().simple.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .simple
            .keys()
            .chain(inner.sorted.keys())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.simple.is_empty() && inner.sorted.is_empty()
    }

    fn ranks(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
        if len == 0 {
            return None;
        }

        let resolve = |idx: isize| -> isize {
            if idx < 0 {
                len as isize + idx
            } else {
                idx
            }
        };

        let start = resolve(start).max(0) as usize;
        let stop = resolve(stop).min(len as isize - 1);
        if stop < 0 || start as isize > stop {
            return None;
        }

        Some((start, stop as usize))
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn simple_search(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().unwrap().simple.get(key).cloned())
    }

    async fn simple_create(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.seed_simple(key, value);
        Ok(())
    }

    async fn simple_delete(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.simple.remove(key);
        inner.sorted.remove(key);
        Ok(())
    }

    async fn sorted_search_order(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let Some(list) = inner.sorted.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = Self::ranks(list.len(), start, stop) else {
            return Ok(Vec::new());
        };

        Ok(list[start..=stop].iter().map(|(_, m)| m.clone()).collect())
    }

    async fn sorted_search_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let Some(list) = inner.sorted.get(key) else {
            return Ok(Vec::new());
        };

        Ok(list
            .iter()
            .filter(|(s, _)| *s >= min && *s <= max)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn sorted_search_index(
        &self,
        key: &str,
        member: &str,
    ) -> Result<Option<usize>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sorted
            .get(key)
            .and_then(|list| list.iter().position(|(_, m)| m == member)))
    }

    async fn sorted_delete_score(&self, key: &str, score: f64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(list) = inner.sorted.get_mut(key) {
            list.retain(|(s, _)| *s != score);
            if list.is_empty() {
                inner.sorted.remove(key);
            }
        }
        Ok(())
    }

    async fn sorted_delete_clean(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sorted.remove(key);
        inner.simple.remove(key);
        Ok(())
    }

    async fn walk(&self, pattern: &str, sink: mpsc::Sender<String>) -> Result<(), StoreError> {
        let keys: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|k| glob_match(pattern, k))
            .collect();

        for key in keys {
            if let Some(delay) = self.walk_delay {
                tokio::time::sleep(delay).await;
            }
            if sink.send(key).await.is_err() {
                return Ok(());
            }
        }

        Ok(())
    }
}

#[derive(Default)]
struct BrokerInner {
    next_id: i64,
    queue: Vec<Task>,
    leased: HashSet<String>,
    created: Vec<Task>,
    deleted: Vec<Task>,
}

/// Lease-queue fake. `expire` releases every lease at once, standing in
/// for the passage of wall-clock time.
#[derive(Default)]
pub struct MemoryBroker {
    inner: Mutex<BrokerInner>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    pub fn created_tasks(&self) -> Vec<Task> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn deleted_count(&self) -> usize {
        self.inner.lock().unwrap().deleted.len()
    }
}

#[async_trait]
impl TaskBroker for MemoryBroker {
    async fn create(&self, task: &Task) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock().unwrap();

        let mut tsk = task.clone();
        if tsk.get(metadata::TASK_ID).is_none() {
            inner.next_id += 1;
            let id = inner.next_id;
            tsk.set(metadata::TASK_ID, id.to_string());
        }

        inner.created.push(tsk.clone());
        inner.queue.push(tsk);
        Ok(())
    }

    async fn search(&self) -> Result<Option<Task>, BrokerError> {
        let mut inner = self.inner.lock().unwrap();

        let found = inner
            .queue
            .iter()
            .find(|t| {
                t.get(metadata::TASK_ID)
                    .is_some_and(|id| !inner.leased.contains(id))
            })
            .cloned();

        if let Some(ref tsk) = found {
            if let Some(id) = tsk.get(metadata::TASK_ID) {
                inner.leased.insert(id.to_string());
            }
        }

        Ok(found)
    }

    async fn expire(&self) -> Result<(), BrokerError> {
        self.inner.lock().unwrap().leased.clear();
        Ok(())
    }

    async fn delete(&self, task: &Task) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock().unwrap();

        let id = task
            .get(metadata::TASK_ID)
            .ok_or_else(|| BrokerError::Backend("task carries no broker id".to_string()))?
            .to_string();

        inner
            .queue
            .retain(|t| t.get(metadata::TASK_ID) != Some(id.as_str()));
        inner.leased.remove(&id);
        inner.deleted.push(task.clone());
        Ok(())
    }
}

/// Broker whose every call fails like a refused TCP connection.
pub struct FailingBroker;

fn refused() -> BrokerError {
    BrokerError::Transport("dial tcp 127.0.0.1:6379: connect: connection refused".to_string())
}

#[async_trait]
impl TaskBroker for FailingBroker {
    async fn create(&self, _task: &Task) -> Result<(), BrokerError> {
        Err(refused())
    }

    async fn search(&self) -> Result<Option<Task>, BrokerError> {
        Err(refused())
    }

    async fn expire(&self) -> Result<(), BrokerError> {
        Err(refused())
    }

    async fn delete(&self, _task: &Task) -> Result<(), BrokerError> {
        Err(refused())
    }
}

/// Mailer fake that records requests and answers with a fixed receipt.
pub struct RecordingMailer {
    receipt: MailReceipt,
    sent: Mutex<Vec<MailRequest>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::with_receipt(MailReceipt::ok())
    }

    pub fn with_receipt(receipt: MailReceipt) -> Self {
        Self {
            receipt,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<MailRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_templated(&self, request: &MailRequest) -> Result<MailReceipt, MailError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(self.receipt.clone())
    }
}
