//! Lease entity definitions.
//!
//! Maps to the `leases` table. Status and payment cycle are stored as text
//! columns constrained by CHECKs in the schema; the domain enums own the
//! canonical string values.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Lease, LeaseStatus, PaymentCycle};

/// Database entity for the `leases` table.
#[derive(Debug, Clone, FromRow)]
pub struct LeaseEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub tenant_id: Uuid,
    pub unit_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_cycle: String,
    pub rent_amount: i64,
    pub deposit_amount: i64,
    pub grace_period_days: i32,
    pub is_auto_renew: bool,
    pub auto_renewal_notice_days: Option<i32>,
    pub status: String,
    pub renewed_from_id: Option<Uuid>,
    pub renewed_to_id: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeaseEntity> for Lease {
    fn from(entity: LeaseEntity) -> Self {
        Lease {
            id: entity.id,
            organization_id: entity.organization_id,
            tenant_id: entity.tenant_id,
            unit_id: entity.unit_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            payment_cycle: PaymentCycle::parse(&entity.payment_cycle)
                .unwrap_or(PaymentCycle::Monthly),
            rent_amount: entity.rent_amount,
            deposit_amount: entity.deposit_amount,
            grace_period_days: entity.grace_period_days,
            is_auto_renew: entity.is_auto_renew,
            auto_renewal_notice_days: entity.auto_renewal_notice_days,
            status: LeaseStatus::parse(&entity.status).unwrap_or(LeaseStatus::Draft),
            renewed_from_id: entity.renewed_from_id,
            renewed_to_id: entity.renewed_to_id,
            paid_at: entity.paid_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_converts_to_domain_model() {
        let entity = LeaseEntity {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            payment_cycle: "annual".into(),
            rent_amount: 1_200_000,
            deposit_amount: 200_000,
            grace_period_days: 5,
            is_auto_renew: true,
            auto_renewal_notice_days: Some(30),
            status: "active".into(),
            renewed_from_id: None,
            renewed_to_id: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let lease: Lease = entity.clone().into();
        assert_eq!(lease.payment_cycle, PaymentCycle::Annual);
        assert_eq!(lease.status, LeaseStatus::Active);
        assert_eq!(lease.id, entity.id);
        assert_eq!(lease.auto_renewal_notice_days, Some(30));
    }
}
