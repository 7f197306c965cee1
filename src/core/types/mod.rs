//! Core domain types
//!
//! Task envelopes, agent records, the closed model set, and the typed
//! pub-sub event variants carried on each channel.

pub mod agent;
pub mod envelope;
pub mod events;
pub mod model;
pub mod task;

pub use agent::{AgentPerformance, AgentRecord, AgentStatus};
pub use envelope::{DirectMessage, Envelope};
pub use events::{
    AlertEvent, ControlCommand, DlqControl, FileEvent, RegistryEvent, TaskEvent, channels,
};
pub use model::ModelId;
pub use task::{DlqRecord, FailureInfo, FailureKind, Priority, Task};
