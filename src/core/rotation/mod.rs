//! API-key rotation
//!
//! Selects a credential per (model, request), tracks per-key health,
//! usage, and latency in the data plane, and proposes cross-model
//! fallback on persistent failure. Selection never blocks and never
//! panics: a pool with no healthy keys degrades to key 0 with a
//! warning.

mod rotator;
mod selection;
#[cfg(test)]
mod tests;

pub use rotator::{KeyRotator, KeyStats, SelectedKey};
