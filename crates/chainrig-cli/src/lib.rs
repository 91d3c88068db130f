//! chainrig CLI library.
//!
//! Metarig loading and the `generate`, `validate` and `inspect` commands.

pub mod commands;
pub mod input;
