//! Process flags.
//!
//! Every option carries a default suitable for local development; mail
//! provider credentials come from the environment.

use std::time::Duration;

use clap::Parser;

use crate::domain::error::ConfigError;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "apiworker",
    about = "Task reconciliation worker for the venture data plane",
    version
)]
pub struct Flags {
    /// The host for binding the apiworker process to.
    #[arg(long, default_value = "127.0.0.1")]
    pub apiworker_host: String,

    /// The port for binding the apiworker process to.
    #[arg(long, default_value_t = 7777)]
    pub apiworker_port: u16,

    /// The time to wait before terminating the process after a shutdown
    /// signal.
    #[arg(long, value_parser = parse_duration, default_value = "5s")]
    pub apiworker_termination_grace_period: Duration,

    /// The lease time after which a searched task becomes runnable again.
    #[arg(long, value_parser = parse_duration, default_value = "30s")]
    pub broker_expiry: Duration,

    /// The interval of the controller to reconcile.
    #[arg(long, value_parser = parse_duration, default_value = "5s")]
    pub controller_interval: Duration,

    /// The timeout for a handler to give up.
    #[arg(long, value_parser = parse_duration, default_value = "5s")]
    pub handler_timeout: Duration,

    /// Structured log output format, text or json.
    #[arg(long, default_value = "text")]
    pub log_format: String,

    /// The host for binding the metrics endpoint to.
    #[arg(long, default_value = "127.0.0.1")]
    pub metrics_host: String,

    /// The port for binding the metrics endpoint to.
    #[arg(long, default_value_t = 8000)]
    pub metrics_port: u16,

    /// The account-level mail provider credential.
    #[arg(long, env = "APIWORKER_POSTMARK_TOKEN_ACCOUNT", default_value = "", hide_env_values = true)]
    pub postmark_token_account: String,

    /// The server-level mail provider credential used for sending.
    #[arg(long, env = "APIWORKER_POSTMARK_TOKEN_SERVER", default_value = "", hide_env_values = true)]
    pub postmark_token_server: String,

    /// The sender address for reminder mail.
    #[arg(long, default_value = "updates@venturemark.co")]
    pub postmark_from: String,

    /// The provider-side template alias for reminder mail.
    #[arg(long, default_value = "weekly-reminder")]
    pub postmark_template: String,

    /// The host for connecting with redis.
    #[arg(long, default_value = "127.0.0.1")]
    pub redis_host: String,

    /// The kind of redis deployment to connect to.
    #[arg(long, default_value = "single")]
    pub redis_kind: String,

    /// The port for connecting with redis.
    #[arg(long, default_value_t = 6379)]
    pub redis_port: u16,
}

fn parse_duration(value: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(value)
}

impl Flags {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.apiworker_host.is_empty() {
            return Err(ConfigError::Invalid(
                "--apiworker-host must not be empty".to_string(),
            ));
        }
        if self.apiworker_termination_grace_period.is_zero() {
            return Err(ConfigError::Invalid(
                "--apiworker-termination-grace-period must not be zero".to_string(),
            ));
        }
        if self.broker_expiry.is_zero() {
            return Err(ConfigError::Invalid(
                "--broker-expiry must not be zero".to_string(),
            ));
        }
        if self.controller_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "--controller-interval must not be zero".to_string(),
            ));
        }
        if self.handler_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "--handler-timeout must not be zero".to_string(),
            ));
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(ConfigError::Invalid(format!(
                "--log-format must be text or json, got {}",
                self.log_format
            )));
        }
        if self.metrics_host.is_empty() {
            return Err(ConfigError::Invalid(
                "--metrics-host must not be empty".to_string(),
            ));
        }
        if self.redis_host.is_empty() {
            return Err(ConfigError::Invalid(
                "--redis-host must not be empty".to_string(),
            ));
        }
        if self.redis_kind != "single" {
            return Err(ConfigError::Invalid(format!(
                "--redis-kind only supports single, got {}",
                self.redis_kind
            )));
        }

        Ok(())
    }
}
