//! Cursor-driven fan-out driver.
//!
//! Applies an action to every key yielded by a streaming producer,
//! concurrently with discovery and under a deadline. The first action or
//! producer error cancels the remaining work; exceeding the deadline
//! yields a timeout the dispatcher demotes to leave-for-retry.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::domain::error::{HandlerError, StoreError};

/// Walk the producer's key stream, running `action` on each key as it
/// arrives. Returns once the producer finished and the stream drained,
/// or with the first error, or with `Timeout` after `deadline`.
///
/// Discovered keys carry no ordering guarantee.
pub async fn fan_out<P, PF, F, Fut>(
    produce: P,
    deadline: Duration,
    mut action: F,
) -> Result<(), HandlerError>
where
    P: FnOnce(mpsc::Sender<String>) -> PF,
    PF: Future<Output = Result<(), StoreError>> + Send + 'static,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), HandlerError>>,
{
    let (tx, mut rx) = mpsc::channel::<String>(1);
    let mut producer = tokio::spawn(produce(tx));

    let drained = tokio::time::timeout(deadline, async {
        while let Some(key) = rx.recv().await {
            action(key).await?;
        }

        match (&mut producer).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HandlerError::from(e)),
            Err(e) => Err(HandlerError::Incomplete(format!("walker task failed: {e}"))),
        }
    })
    .await;

    // The dropped receiver closes the sink; abort covers a producer
    // stuck before its first send.
    producer.abort();

    match drained {
        Ok(result) => result,
        Err(_) => Err(HandlerError::Timeout(deadline)),
    }
}
