//! Database entity definitions with sqlx FromRow derives.

pub mod directory;
pub mod lease;
pub mod notification;

pub use directory::{TenantContactEntity, TenantRefEntity, UnitRefEntity};
pub use lease::LeaseEntity;
pub use notification::{NotificationLogEntity, NotificationRuleEntity};
