//! Data-plane storage
//!
//! The Redis-like data plane is the single shared mutable resource;
//! every cross-process state mutation goes through this layer.

pub mod keyspace;
pub mod redis;

pub use redis::{RedisPool, Subscription};
