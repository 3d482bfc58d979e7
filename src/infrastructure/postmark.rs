//! Postmark mail adapter.
//!
//! Sends templated mail through the Postmark HTTP API. Transport
//! failures surface as errors; provider rejections come back as a
//! receipt for the handler to interpret.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::MailError;
use crate::domain::ports::{MailReceipt, MailRequest, Mailer};

const DEFAULT_ENDPOINT: &str = "https://api.postmarkapp.com";

pub struct PostmarkMailer {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PostmarkMailer {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token,
        }
    }

    /// Point the adapter at a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TemplatedEmail<'a> {
    from: &'a str,
    to: &'a str,
    template_alias: &'a str,
    template_model: &'a Value,
    track_opens: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TemplatedEmailResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl Mailer for PostmarkMailer {
    async fn send_templated(&self, request: &MailRequest) -> Result<MailReceipt, MailError> {
        let body = TemplatedEmail {
            from: &request.from,
            to: &request.to,
            template_alias: &request.template_alias,
            template_model: &request.model,
            track_opens: request.track_opens,
        };

        let response = self
            .client
            .post(format!("{}/email/withTemplate", self.endpoint))
            .header("X-Postmark-Server-Token", &self.token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let receipt: TemplatedEmailResponse = response
            .json()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(MailReceipt {
            message: receipt.message,
            error_code: receipt.error_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> MailRequest {
        MailRequest {
            template_alias: "weekly-reminder".to_string(),
            model: json!({"updateCount": 2, "plural": true}),
            from: "updates@venturemark.co".to_string(),
            to: "user@example.com".to_string(),
            track_opens: true,
        }
    }

    #[tokio::test]
    async fn delivers_the_templated_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/email/withTemplate")
            .match_header("x-postmark-server-token", "tok")
            .match_body(mockito::Matcher::PartialJson(json!({
                "From": "updates@venturemark.co",
                "To": "user@example.com",
                "TemplateAlias": "weekly-reminder",
                "TrackOpens": true,
            })))
            .with_status(200)
            .with_body(r#"{"ErrorCode":0,"Message":"OK"}"#)
            .create_async()
            .await;

        let mailer = PostmarkMailer::new("tok".to_string()).with_endpoint(server.url());
        let receipt = mailer.send_templated(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(receipt, MailReceipt::ok());
    }

    #[tokio::test]
    async fn provider_rejections_come_back_as_receipts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/email/withTemplate")
            .with_status(422)
            .with_body(r#"{"ErrorCode":406,"Message":"Inactive recipient"}"#)
            .create_async()
            .await;

        let mailer = PostmarkMailer::new("tok".to_string()).with_endpoint(server.url());
        let receipt = mailer.send_templated(&request()).await.unwrap();

        assert_eq!(receipt.error_code, 406);
        assert_eq!(receipt.message, "Inactive recipient");
    }

    #[tokio::test]
    async fn unreachable_providers_are_transport_errors() {
        let mailer =
            PostmarkMailer::new("tok".to_string()).with_endpoint("http://127.0.0.1:1");
        let result = mailer.send_templated(&request()).await;

        assert!(matches!(result, Err(MailError::Transport(_))));
    }
}
