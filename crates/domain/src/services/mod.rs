//! Business logic services.

pub mod availability;
pub mod batch;
pub mod channel;
pub mod memory;
pub mod renewal;
pub mod rules;
pub mod store;

pub use availability::{availability_key, batch_is_available, is_available, AvailabilityRequest};
pub use batch::{BatchItemError, BatchReport};
pub use channel::{
    ChannelSendResult, ChannelSender, CredentialsResolver, MockChannelSender,
    StaticCredentialsResolver,
};
pub use memory::{MemoryDirectoryStore, MemoryLeaseStore, MemoryNotificationStore};
pub use renewal::{
    can_cancel_auto_renewal, renewal_deadline, renewal_period, should_auto_renew, successor_lease,
};
pub use rules::{target_window, DayWindow};
pub use store::{DirectoryStore, LeaseStore, NotificationStore, StoreError};
