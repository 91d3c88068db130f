//! chainrig End-to-End Test Infrastructure
//!
//! Metarig fixtures and helpers for the integration tests:
//!
//! - Generation: metarig -> armature + report
//! - Drivers: blend properties evaluated through the armature
//! - CLI: the `generate`, `validate` and `inspect` commands against files
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p chainrig-tests
//! ```

pub mod fixtures;
pub mod harness;

pub use harness::{constraints_to, generate_metarig, Generated};
