//! Shared utilities and common types for the lease engine.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic for lease payloads and spreadsheet imports
//! - `{{variable}}` message template rendering

pub mod template;
pub mod validation;
