//! Redis adapters for the key-value store and the task broker.

use redis::aio::ConnectionManager;
use redis::RedisError;

use crate::domain::error::{BrokerError, StoreError};

pub mod broker;
pub mod store;

pub use broker::RedisBroker;
pub use store::RedisStore;

/// Open a managed connection that reconnects on demand.
pub async fn connect(host: &str, port: u16) -> Result<ConnectionManager, StoreError> {
    let client =
        redis::Client::open(format!("redis://{host}:{port}/")).map_err(store_error)?;

    ConnectionManager::new(client).await.map_err(store_error)
}

fn connection_class(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
}

pub(crate) fn store_error(err: RedisError) -> StoreError {
    if connection_class(&err) {
        StoreError::Transport(err.to_string())
    } else {
        StoreError::Backend(err.to_string())
    }
}

pub(crate) fn broker_error(err: RedisError) -> BrokerError {
    if connection_class(&err) {
        BrokerError::Transport(err.to_string())
    } else {
        BrokerError::Backend(err.to_string())
    }
}
