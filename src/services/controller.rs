//! Periodic reconciliation controller.
//!
//! Each tick gives the weekly scheduler a chance to emit, then advances
//! the phase oscillator and runs the selected phase: an expiration sweep
//! returning overdue leases, or a task pull feeding the dispatcher.
//! Dial-class transport faults are demoted to warnings so a flapping
//! connection does not halt the loop; everything else goes to the
//! process error sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::error::{self, HandlerError};
use crate::domain::ports::TaskBroker;
use crate::infrastructure::metrics::Metrics;
use crate::services::dispatcher::{Dispatcher, Outcome};
use crate::services::oscillator::Oscillator;
use crate::services::scheduler::WeeklyScheduler;

pub struct Controller {
    broker: Arc<dyn TaskBroker>,
    dispatcher: Dispatcher,
    scheduler: WeeklyScheduler,
    metrics: Arc<Metrics>,
    interval: Duration,
    oscillator: Oscillator,
}

impl Controller {
    pub fn new(
        broker: Arc<dyn TaskBroker>,
        dispatcher: Dispatcher,
        scheduler: WeeklyScheduler,
        metrics: Arc<Metrics>,
        interval: Duration,
    ) -> Self {
        Self {
            broker,
            dispatcher,
            scheduler,
            metrics,
            interval,
            oscillator: Oscillator::new(),
        }
    }

    /// Drive the reconciliation loop until the shutdown signal flips.
    /// Fatal errors go to `errors`; the loop keeps ticking after them
    /// only if the sink stays open.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
        errors: mpsc::Sender<anyhow::Error>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.interval, "controller loop running");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("controller draining and shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        if errors.send(e).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// One reconciliation tick: scheduler pass, then oscillator phase.
    pub async fn tick(&mut self) -> Result<(), anyhow::Error> {
        self.metrics.ticks.inc();

        if let Err(e) = self.scheduler.ensure().await {
            if error::is_dial(&e) {
                self.metrics.transient_errors.inc();
                warn!(error = %e, "scheduler hit transient transport fault");
            } else {
                return Err(e.into());
            }
        }

        if let Err(e) = self.search_tasks().await {
            if error::is_dial(&e) {
                self.metrics.transient_errors.inc();
                warn!(error = %e, "reconciliation hit transient transport fault");
            } else {
                self.metrics.handler_failures.inc();
                return Err(e.into());
            }
        }

        Ok(())
    }

    async fn search_tasks(&mut self) -> Result<(), HandlerError> {
        if self.oscillator.check() {
            self.oscillator.reset();
        }
        if self.oscillator.index() == [0, 0] {
            self.oscillator.shift();
        }

        let result = self.run_phase().await;

        // Always shift on tick exit, error or not.
        self.oscillator.shift();

        result
    }

    async fn run_phase(&mut self) -> Result<(), HandlerError> {
        let index = self.oscillator.index();

        if index[0] == 1 {
            self.broker.expire().await?;
        }

        if index[1] == 1 {
            let Some(tsk) = self.broker.search().await? else {
                debug!("no runnable task");
                return Ok(());
            };

            match self.dispatcher.dispatch(self.broker.as_ref(), &tsk).await? {
                Outcome::Completed => self.metrics.tasks_completed.inc(),
                Outcome::LeftForRetry => self.metrics.tasks_retried.inc(),
            }
        }

        Ok(())
    }
}
