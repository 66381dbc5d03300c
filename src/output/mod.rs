//! Output formatting module for oregex
//!
//! Provides JSON (default) and text output formats.

pub mod json;
pub mod text;
pub mod types;

pub use types::*;
