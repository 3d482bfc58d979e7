//! Apiworker daemon entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use apiworker::domain::ports::{KeyStore, Mailer, TaskBroker};
use apiworker::infrastructure::postmark::PostmarkMailer;
use apiworker::infrastructure::redis::{self, RedisBroker, RedisStore};
use apiworker::infrastructure::{metrics, Flags, Metrics};
use apiworker::services::handlers::{self, ReminderSettings};
use apiworker::services::{Controller, Dispatcher, WeeklyScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let flags = Flags::parse();
    flags.validate()?;

    init_tracing(&flags.log_format);

    let con = redis::connect(&flags.redis_host, flags.redis_port)
        .await
        .context("failed to connect to redis")?;

    let store: Arc<dyn KeyStore> = Arc::new(RedisStore::new(con.clone()));
    let broker: Arc<dyn TaskBroker> = Arc::new(RedisBroker::new(con, flags.broker_expiry));
    let mailer: Arc<dyn Mailer> =
        Arc::new(PostmarkMailer::new(flags.postmark_token_server.clone()));

    let metrics = Arc::new(Metrics::new().context("failed to build metrics registry")?);

    let handlers = handlers::registry(
        store.clone(),
        broker.clone(),
        mailer,
        flags.handler_timeout,
        ReminderSettings {
            from: flags.postmark_from.clone(),
            template_alias: flags.postmark_template.clone(),
        },
    );
    let dispatcher = Dispatcher::new(handlers)?;
    let scheduler = WeeklyScheduler::new(broker.clone(), store);

    let controller = Controller::new(
        broker,
        dispatcher,
        scheduler,
        metrics.clone(),
        flags.controller_interval,
    );

    let (error_tx, mut error_rx) = mpsc::channel::<anyhow::Error>(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(metrics::serve(
        metrics,
        flags.metrics_host.clone(),
        flags.metrics_port,
        error_tx.clone(),
    ));
    let controller_handle = tokio::spawn(controller.run(shutdown_rx, error_tx));

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
        Some(e) = error_rx.recv() => {
            error!(error = %e, "fatal controller error");
            return Err(e);
        }
    }

    info!("shutdown signal received, draining");
    let _ = shutdown_tx.send(true);
    let _ = tokio::time::timeout(
        flags.apiworker_termination_grace_period,
        controller_handle,
    )
    .await;

    Ok(())
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_env("APIWORKER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
