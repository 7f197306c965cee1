//! Agent coordination
//!
//! A discoverable registry of worker agents with heartbeat liveness,
//! advisory per-file locks, and a low-latency messaging surface.
//! Lock recovery relies solely on TTLs; nothing force-releases a lock
//! it does not own outside the orchestrator's administrative path.

mod coordinator;
mod locks;
mod messaging;
#[cfg(test)]
mod tests;

pub use coordinator::{AgentCensus, Coordinator};
