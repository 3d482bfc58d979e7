//! Prometheus counters and the HTTP metrics endpoint.
//!
//! The endpoint is bound for process lifetime; there is no teardown.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use tokio::sync::mpsc;
use tracing::info;

pub struct Metrics {
    registry: Registry,
    pub ticks: IntCounter,
    pub tasks_completed: IntCounter,
    pub tasks_retried: IntCounter,
    pub transient_errors: IntCounter,
    pub handler_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let ticks = IntCounter::new("apiworker_ticks_total", "Reconciliation ticks run")?;
        let tasks_completed = IntCounter::new(
            "apiworker_tasks_completed_total",
            "Tasks handled and deleted",
        )?;
        let tasks_retried = IntCounter::new(
            "apiworker_tasks_retried_total",
            "Tasks left with the broker for retry",
        )?;
        let transient_errors = IntCounter::new(
            "apiworker_transient_errors_total",
            "Dial-class faults demoted to warnings",
        )?;
        let handler_failures = IntCounter::new(
            "apiworker_handler_failures_total",
            "Handler errors surfaced to the error sink",
        )?;

        registry.register(Box::new(ticks.clone()))?;
        registry.register(Box::new(tasks_completed.clone()))?;
        registry.register(Box::new(tasks_retried.clone()))?;
        registry.register(Box::new(transient_errors.clone()))?;
        registry.register(Box::new(handler_failures.clone()))?;

        Ok(Self {
            registry,
            ticks,
            tasks_completed,
            tasks_retried,
            transient_errors,
            handler_failures,
        })
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

async fn render_metrics(State(metrics): State<Arc<Metrics>>) -> (StatusCode, String) {
    match metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Serve `/metrics` until the process exits. Bind or serve failures go
/// to the error sink.
pub async fn serve(
    metrics: Arc<Metrics>,
    host: String,
    port: u16,
    errors: mpsc::Sender<anyhow::Error>,
) {
    let app = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics);

    let address = format!("{host}:{port}");

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(l) => l,
        Err(e) => {
            let _ = errors.send(e.into()).await;
            return;
        }
    };

    info!(address = %address, "metrics endpoint running");

    if let Err(e) = axum::serve(listener, app).await {
        let _ = errors.send(e.into()).await;
    }
}
