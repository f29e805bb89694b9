//! Lease lifecycle and notification trigger engine.
//!
//! Wires the domain services and persistence repositories into the scheduled
//! background jobs: the notification tick, the auto-renewal runner, and the
//! bulk import coordinator.

pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod services;
