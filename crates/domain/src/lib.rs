//! Domain layer for the lease engine.
//!
//! This crate contains:
//! - Domain models (Lease, NotificationRule, NotificationLog)
//! - Pure business services (availability, renewal date math, rule windows)
//! - Store and channel trait seams with in-memory implementations for tests

pub mod models;
pub mod services;
