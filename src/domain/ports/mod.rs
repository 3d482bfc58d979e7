//! Ports implemented by infrastructure adapters.

pub mod broker;
pub mod mailer;
pub mod store;

pub use broker::TaskBroker;
pub use mailer::{MailReceipt, MailRequest, Mailer};
pub use store::KeyStore;
