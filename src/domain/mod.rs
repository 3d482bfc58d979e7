//! Domain layer for the apiworker reconciliation system.
//!
//! Contains the task envelope, stored record schemas, key families,
//! error kinds, and the ports implemented by infrastructure adapters.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{BrokerError, ConfigError, ErrorKind, HandlerError, MailError, StoreError};
