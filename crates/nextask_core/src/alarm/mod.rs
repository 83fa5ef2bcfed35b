//! Overdue alarms: a pure tracker plus a tokio-driven periodic checker around it.

mod scheduler;
mod tracker;

pub use scheduler::{AlarmChecker, AlarmHandle, TaskSource, start};
pub use tracker::{CheckOutcome, OverdueTracker};
