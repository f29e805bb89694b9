//! Store trait seams consumed by the engine services.
//!
//! The relational store is reached through these narrow command/query
//! interfaces. The persistence crate implements them over PostgreSQL; the
//! in-memory implementations in [`super::memory`] back unit and integration
//! tests.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Lease, NewActivity, NewLease, NewNotificationLog, NotificationLog, NotificationRule,
    NotificationTrigger, TenantContact, TenantRef, UnitRef,
};
use crate::services::rules::DayWindow;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Lease queries and commands.
#[async_trait::async_trait]
pub trait LeaseStore: Send + Sync {
    /// All Draft/Active leases for any of the given units, in ONE query
    /// round-trip regardless of how many units are asked for.
    async fn find_blocking_for_units(&self, unit_ids: &[Uuid]) -> Result<Vec<Lease>, StoreError>;

    /// Insert one lease row.
    async fn create(&self, lease: NewLease) -> Result<Lease, StoreError>;

    /// Store-level renewal prefilter: Active, auto-renew with notice days
    /// configured, and no successor yet. The date deadline is re-checked
    /// in-process because "now" is an explicit parameter there.
    async fn find_renewal_candidates(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<Lease>, StoreError>;

    /// Atomically insert the successor lease and mark the original Ended
    /// with its `renewed_to_id` backlink. Both writes commit or neither is
    /// visible.
    async fn create_renewal(
        &self,
        original_id: Uuid,
        successor: NewLease,
    ) -> Result<Lease, StoreError>;

    /// Active, unpaid leases whose due (start) date falls in the window.
    async fn find_payment_reminder_matches(
        &self,
        organization_id: Uuid,
        window: DayWindow,
    ) -> Result<Vec<Lease>, StoreError>;

    /// Active leases whose end date falls in the window.
    async fn find_lease_expiring_matches(
        &self,
        organization_id: Uuid,
        window: DayWindow,
    ) -> Result<Vec<Lease>, StoreError>;

    /// Draft, unpaid leases whose due date has passed as of `now`.
    async fn find_payment_late(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Lease>, StoreError>;
}

/// Tenant/unit resolution and audit appends for bulk import and dispatch.
#[async_trait::async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Resolve tenants by email within an organization, one query for the
    /// whole email set.
    async fn find_tenants_by_emails(
        &self,
        organization_id: Uuid,
        emails: &[String],
    ) -> Result<Vec<TenantRef>, StoreError>;

    /// Resolve units by (property name, unit name) pairs within an
    /// organization, one query for the whole set.
    async fn find_units_by_names(
        &self,
        organization_id: Uuid,
        names: &[(String, String)],
    ) -> Result<Vec<UnitRef>, StoreError>;

    /// Resolve one unit by id, for template variables.
    async fn find_unit(&self, unit_id: Uuid) -> Result<Option<UnitRef>, StoreError>;

    /// Contact info and preferred channel for one tenant.
    async fn contact_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantContact>, StoreError>;

    /// Move a tenant to Active status (after their lease is created).
    async fn mark_tenant_active(&self, tenant_id: Uuid) -> Result<(), StoreError>;

    /// Append one activity row.
    async fn record_activity(&self, activity: NewActivity) -> Result<(), StoreError>;
}

/// Notification rules and the append-only dispatch log.
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    /// Organizations that have at least one active rule.
    async fn organizations_with_active_rules(&self) -> Result<Vec<Uuid>, StoreError>;

    /// Active rules for one organization and trigger, a read-only snapshot
    /// for the current tick.
    async fn active_rules(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
    ) -> Result<Vec<NotificationRule>, StoreError>;

    /// Append a pending log row before the network call.
    async fn create_pending(
        &self,
        log: NewNotificationLog,
    ) -> Result<NotificationLog, StoreError>;

    /// Transition a pending row to sent.
    async fn mark_sent(&self, log_id: Uuid, sent_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Transition a pending row to failed with the provider's reason.
    async fn mark_failed(&self, log_id: Uuid, reason: &str) -> Result<(), StoreError>;

    /// Whether a non-failed log row already exists for this (organization,
    /// trigger, lease) on the given calendar day. Idempotency probe for the
    /// offset triggers.
    async fn was_notified_on(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
        lease_id: Uuid,
        day: NaiveDate,
    ) -> Result<bool, StoreError>;
}
