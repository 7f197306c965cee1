//! Configuration models, one file per concern

pub mod coordination;
pub mod dlq;
pub mod orchestrator;
pub mod queue;
pub mod redis;
pub mod rotation;

pub use coordination::CoordinationConfig;
pub use dlq::DlqConfig;
pub use orchestrator::LoopConfig;
pub use queue::{ModelSetConfig, QueueConfig};
pub use redis::RedisConfig;
pub use rotation::{KeyPoolConfig, RotationConfig, RotationStrategy};
