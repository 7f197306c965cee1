//! # swarmq
//!
//! Redis-backed multi-agent task orchestrator. Dispatches code-generation
//! tasks to a pool of heterogeneous LLM-backed worker agents, coordinating
//! file-level mutual exclusion, retry policy, dead-letter handling, and
//! fleet health through a shared Redis data plane.
//!
//! ## Subsystems
//!
//! - **Queue dispatch** — per-model FIFO queues with priority lanes and
//!   an atomic reliable-queue claim
//! - **Agent coordination** — registry, heartbeats, advisory file locks,
//!   direct and broadcast messaging
//! - **DLQ management** — failure classification, per-kind retry
//!   strategies with durable delays, archival, permanent failure
//! - **Key rotation** — multi-key pools per model with round-robin,
//!   least-used, weighted, and health-based strategies
//! - **Orchestrator loop** — health sweeps, orphan reaping, rebalancing,
//!   external control
//!
//! ## Worker example
//!
//! ```rust,no_run
//! use swarmq::{Config, Coordinator, Dispatcher, RedisPool};
//! use swarmq::core::types::{AgentRecord, ModelId};
//!
//! #[tokio::main]
//! async fn main() -> swarmq::Result<()> {
//!     let config = Config::from_env()?;
//!     let redis = RedisPool::new(&config.redis).await?;
//!
//!     let coordinator = Coordinator::new(redis.clone(), config.coordination.clone());
//!     let dispatcher = Dispatcher::new(redis.clone(), config.queue.clone());
//!
//!     let agent = AgentRecord::new("gpt-01", vec!["gpt-4o".into()], chrono::Utc::now().timestamp_millis());
//!     coordinator.register(&agent).await?;
//!
//!     while let Some(task) = dispatcher.claim(ModelId::Gpt4o, &agent.id).await? {
//!         // ... execute the prompt against the provider ...
//!         dispatcher.complete(&task).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use core::coordination::Coordinator;
pub use core::dispatch::Dispatcher;
pub use core::dlq::DlqManager;
pub use core::orchestrator::Orchestrator;
pub use core::rotation::KeyRotator;
pub use storage::RedisPool;
pub use utils::error::{OrchestratorError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
