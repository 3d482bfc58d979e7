//! Mail provider port.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::MailError;

/// A templated send request.
#[derive(Clone, Debug)]
pub struct MailRequest {
    pub template_alias: String,
    pub model: Value,
    pub from: String,
    pub to: String,
    pub track_opens: bool,
}

/// The provider's verdict. `message == "OK"` is success; callers treat
/// error code 406 (inactive recipient) as success as well.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailReceipt {
    pub message: String,
    pub error_code: i64,
}

impl MailReceipt {
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
            error_code: 0,
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a templated mail. Transport failures are errors; a
    /// provider rejection comes back as a receipt for the caller to
    /// interpret.
    async fn send_templated(&self, request: &MailRequest) -> Result<MailReceipt, MailError>;
}
