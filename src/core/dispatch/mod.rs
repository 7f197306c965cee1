//! Queue dispatch
//!
//! The authoritative source of pending and in-flight work: per-model
//! FIFO queues with priority lanes, reliable-queue claim semantics,
//! ingest de-duplication, and orphan recovery. Producers are never
//! blocked; queue depth is a first-class observable.

mod dispatcher;
mod orphan;
#[cfg(test)]
mod tests;

pub use dispatcher::{Dispatcher, QueueDepths};
