//! Core orchestration subsystems
//!
//! - `types` - domain types shared across the data plane
//! - `rotation` - API-key selection and per-key health tracking
//! - `coordination` - agent registry, heartbeats, file locks, messaging
//! - `dispatch` - per-model queues with atomic claim semantics
//! - `dlq` - failure classification and retry strategies
//! - `orchestrator` - health sweep, rebalancing, external control

pub mod coordination;
pub mod dispatch;
pub mod dlq;
pub mod orchestrator;
pub mod rotation;
pub mod types;
