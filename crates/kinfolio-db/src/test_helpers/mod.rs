//! Test helpers for crates that depend on the repositories
//!
//! Enabled with the `test-helpers` feature.

pub mod memory;

pub use memory::InMemoryDatabase;
