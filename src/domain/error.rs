//! Error kinds and the transient-fault classifier.
//!
//! Handler outcomes fall into three classes: success, leave-for-retry
//! (`Incomplete`, `Timeout`), and genuine failure. The controller further
//! demotes dial-class transport faults to warnings so a flapping store or
//! broker connection does not halt the reconciliation loop.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// Process configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Key-value store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection-level fault, assumed transient.
    #[error("store transport: {0}")]
    Transport(String),

    /// Command-level fault reported by the store.
    #[error("store backend: {0}")]
    Backend(String),

    #[error("malformed record under {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Task broker failures. An empty queue is not an error; `search`
/// signals it with `Ok(None)`.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connection-level fault, assumed transient.
    #[error("broker transport: {0}")]
    Transport(String),

    #[error("broker backend: {0}")]
    Backend(String),

    #[error("task codec: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Mail provider failures.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport: {0}")]
    Transport(String),

    #[error("mail delivery rejected: code {code}: {message}")]
    Delivery { code: i64, message: String },
}

/// Failures surfaced by a handler's `ensure`.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid task: {0}")]
    InvalidTask(String),

    /// The handler made progress but did not finish; the task must be
    /// left with the broker for retry.
    #[error("incomplete execution: {0}")]
    Incomplete(String),

    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    MailDelivery(#[from] MailError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Broker(#[from] BrokerError),
}

impl HandlerError {
    /// Whether the dispatcher should leave the task for retry instead of
    /// failing the tick. Timeouts are demoted alongside incomplete
    /// executions so long-running fan-outs resume after lease expiry.
    pub fn leaves_for_retry(&self) -> bool {
        matches!(self, Self::Incomplete(_) | Self::Timeout(_))
    }
}

/// Coarse error classes used for observability and controller policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidConfig,
    InvalidTask,
    Timeout,
    IncompleteExecution,
    Dial,
    MailDelivery,
    Other,
}

const DIAL_NEEDLES: [&str; 5] = [
    "eof",
    "dial tcp",
    "read tcp",
    "connection refused",
    "connection reset",
];

/// Reports whether any error in the chain is a transient transport
/// fault: an exact transport kind, or a message carrying one of the
/// well-known dial substrings.
pub fn is_dial(err: &(dyn StdError + 'static)) -> bool {
    let mut cur = Some(err);

    while let Some(e) = cur {
        if let Some(StoreError::Transport(_)) = e.downcast_ref::<StoreError>() {
            return true;
        }
        if let Some(BrokerError::Transport(_)) = e.downcast_ref::<BrokerError>() {
            return true;
        }

        let msg = e.to_string().to_lowercase();
        if DIAL_NEEDLES.iter().any(|n| msg.contains(n)) {
            return true;
        }

        cur = e.source();
    }

    false
}

/// Classifies an error chain into one of the coarse kinds. Dial takes
/// precedence so transport faults wrapped in handler errors still demote.
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorKind {
    if is_dial(err) {
        return ErrorKind::Dial;
    }

    let mut cur = Some(err);

    while let Some(e) = cur {
        if e.downcast_ref::<ConfigError>().is_some() {
            return ErrorKind::InvalidConfig;
        }

        if let Some(h) = e.downcast_ref::<HandlerError>() {
            return match h {
                HandlerError::InvalidTask(_) => ErrorKind::InvalidTask,
                HandlerError::Incomplete(_) => ErrorKind::IncompleteExecution,
                HandlerError::Timeout(_) => ErrorKind::Timeout,
                HandlerError::MailDelivery(_) => ErrorKind::MailDelivery,
                HandlerError::Store(_) | HandlerError::Broker(_) => ErrorKind::Other,
            };
        }

        if e.downcast_ref::<MailError>().is_some() {
            return ErrorKind::MailDelivery;
        }

        cur = e.source();
    }

    ErrorKind::Other
}
