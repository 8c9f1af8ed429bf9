//! Deterministic JSON output for resolved properties.
//!
//! - Keys sorted alphabetically (via `BTreeMap` in the output types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
