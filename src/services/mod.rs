//! Reconciliation services: the controller loop, the phase oscillator,
//! the handler dispatcher, the weekly scheduler, and the fan-out driver.

pub mod controller;
pub mod dispatcher;
pub mod fanout;
pub mod handlers;
pub mod oscillator;
pub mod scheduler;

pub use controller::Controller;
pub use dispatcher::{Dispatcher, Outcome};
pub use handlers::Handler;
pub use oscillator::Oscillator;
pub use scheduler::WeeklyScheduler;
