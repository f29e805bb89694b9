//! Engine services: dispatch, orchestration, renewals, and bulk import.

pub mod bulk_import;
pub mod channels;
pub mod dispatch;
pub mod orchestrator;
pub mod renewals;

pub use bulk_import::BulkImportService;
pub use channels::{build_senders, EmailSender, TelegramSender, WhatsAppSender};
pub use dispatch::{DispatchOutcome, DispatchRequest, DispatchRouter};
pub use orchestrator::{NotificationOrchestrator, TickReport, TriggerRunResult};
pub use renewals::AutoRenewalService;
