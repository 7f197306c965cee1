//! Dead-letter queue management
//!
//! Processes failed tasks on a fixed cadence: gates on age and retry
//! count, classifies the failure message, applies the per-kind retry
//! strategy, and either schedules a durable delayed re-injection or
//! terminates the task into the archive or the permanent-failure sink.

mod archive;
pub mod classify;
mod manager;
mod schedule;
mod strategy;
#[cfg(test)]
mod tests;

pub use manager::{DlqManager, TickStats};
pub use schedule::ScheduledRetry;
pub use strategy::{Disposition, evaluate};
