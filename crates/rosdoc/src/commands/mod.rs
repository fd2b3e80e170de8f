//! CLI command implementations.

pub mod document;
