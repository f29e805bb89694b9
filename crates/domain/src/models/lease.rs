//! Lease agreement domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing cycle of a lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCycle {
    Daily,
    Monthly,
    Annual,
}

impl PaymentCycle {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Parse from a database or spreadsheet string (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a lease.
///
/// Draft -> Active -> Ended, with Cancelled reachable from Draft/Active.
/// Ended and Cancelled are terminal; an ended lease is immutable except for
/// the `renewed_to_id` backlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Draft,
    Active,
    Ended,
    Cancelled,
}

impl LeaseStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from a database string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "ended" => Some(Self::Ended),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether a lease in this status occupies its unit for booking purposes.
    pub fn occupies_unit(&self) -> bool {
        matches!(self, Self::Draft | Self::Active)
    }
}

impl std::fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tenancy period on one unit.
///
/// `start_date` and `end_date` are inclusive calendar dates. Monetary amounts
/// are stored in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_cycle: PaymentCycle,
    pub rent_amount: i64,
    pub deposit_amount: i64,
    pub grace_period_days: i32,
    pub is_auto_renew: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renewal_notice_days: Option<i32>,
    pub status: LeaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewed_from_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewed_to_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lease {
    /// Whether a renewal lease has already been created from this lease.
    pub fn has_successor(&self) -> bool {
        self.renewed_to_id.is_some()
    }

    /// Whether this lease itself was created by an auto-renewal.
    pub fn is_renewal(&self) -> bool {
        self.renewed_from_id.is_some()
    }
}

/// Input for creating a lease row.
#[derive(Debug, Clone)]
pub struct NewLease {
    pub organization_id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_cycle: PaymentCycle,
    pub rent_amount: i64,
    pub deposit_amount: i64,
    pub grace_period_days: i32,
    pub is_auto_renew: bool,
    pub auto_renewal_notice_days: Option<i32>,
    pub status: LeaseStatus,
    pub renewed_from_id: Option<Uuid>,
}
