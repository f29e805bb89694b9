//! Background jobs and the scheduler that drives them.

pub mod notifications;
pub mod renewals;
pub mod scheduler;

pub use notifications::NotificationTickJob;
pub use renewals::AutoRenewalJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
