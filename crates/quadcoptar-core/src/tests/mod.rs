//! Crate-level tests for whole rounds.
//!
//! - `scenarios.rs`: end-to-end rounds driven through the public session API
//! - `determinism.rs`: same seed and same commands give the same state
//! - `properties.rs`: `proptest` checks of round invariants
//! - `helpers.rs`: session setup and event filtering utilities

mod helpers;
mod properties;

pub use helpers::*;
