//! Domain models for the lease engine.

pub mod activity;
pub mod bulk_import;
pub mod directory;
pub mod lease;
pub mod notification;

pub use activity::NewActivity;
pub use bulk_import::{
    row_number, ImportReport, ImportSummary, InvalidRow, LeaseImportRow, ParsedImportRow,
    MAX_IMPORT_ROWS,
};
pub use directory::{TenantContact, TenantRef, TenantStatus, UnitRef};
pub use lease::{Lease, LeaseStatus, NewLease, PaymentCycle};
pub use notification::{
    ChannelCredentials, NewNotificationLog, NotificationChannel, NotificationLog,
    NotificationLogStatus, NotificationRule, NotificationTrigger,
};
