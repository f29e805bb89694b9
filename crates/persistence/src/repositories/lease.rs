//! Lease repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{Lease, NewLease};
use domain::services::rules::DayWindow;
use domain::services::{LeaseStore, StoreError};

use crate::entities::LeaseEntity;
use crate::metrics::QueryTimer;

use super::store_err;

/// Repository for lease-related database operations.
#[derive(Clone)]
pub struct LeaseRepository {
    pool: PgPool,
}

impl LeaseRepository {
    /// Creates a new LeaseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_lease(&self, lease: &NewLease) -> Result<LeaseEntity, sqlx::Error> {
        sqlx::query_as::<_, LeaseEntity>(
            r#"
            INSERT INTO leases (organization_id, tenant_id, unit_id, start_date, end_date,
                                payment_cycle, rent_amount, deposit_amount, grace_period_days,
                                is_auto_renew, auto_renewal_notice_days, status, renewed_from_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(lease.organization_id)
        .bind(lease.tenant_id)
        .bind(lease.unit_id)
        .bind(lease.start_date)
        .bind(lease.end_date)
        .bind(lease.payment_cycle.as_str())
        .bind(lease.rent_amount)
        .bind(lease.deposit_amount)
        .bind(lease.grace_period_days)
        .bind(lease.is_auto_renew)
        .bind(lease.auto_renewal_notice_days)
        .bind(lease.status.as_str())
        .bind(lease.renewed_from_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl LeaseStore for LeaseRepository {
    async fn find_blocking_for_units(&self, unit_ids: &[Uuid]) -> Result<Vec<Lease>, StoreError> {
        let timer = QueryTimer::new("find_blocking_leases_for_units");
        let result = sqlx::query_as::<_, LeaseEntity>(
            r#"
            SELECT * FROM leases
            WHERE unit_id = ANY($1) AND status IN ('draft', 'active')
            ORDER BY start_date
            "#,
        )
        .bind(unit_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(Lease::from)
            .collect())
    }

    async fn create(&self, lease: NewLease) -> Result<Lease, StoreError> {
        let timer = QueryTimer::new("create_lease");
        let result = self.insert_lease(&lease).await;
        timer.record();
        result.map(Lease::from).map_err(store_err)
    }

    async fn find_renewal_candidates(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<Lease>, StoreError> {
        let timer = QueryTimer::new("find_renewal_candidates");
        let result = sqlx::query_as::<_, LeaseEntity>(
            r#"
            SELECT * FROM leases
            WHERE status = 'active'
              AND is_auto_renew = true
              AND auto_renewal_notice_days IS NOT NULL
              AND renewed_to_id IS NULL
              AND ($1::uuid IS NULL OR organization_id = $1)
            ORDER BY end_date
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(Lease::from)
            .collect())
    }

    async fn create_renewal(
        &self,
        original_id: Uuid,
        successor: NewLease,
    ) -> Result<Lease, StoreError> {
        let timer = QueryTimer::new("create_renewal");
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let entity = sqlx::query_as::<_, LeaseEntity>(
            r#"
            INSERT INTO leases (organization_id, tenant_id, unit_id, start_date, end_date,
                                payment_cycle, rent_amount, deposit_amount, grace_period_days,
                                is_auto_renew, auto_renewal_notice_days, status, renewed_from_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(successor.organization_id)
        .bind(successor.tenant_id)
        .bind(successor.unit_id)
        .bind(successor.start_date)
        .bind(successor.end_date)
        .bind(successor.payment_cycle.as_str())
        .bind(successor.rent_amount)
        .bind(successor.deposit_amount)
        .bind(successor.grace_period_days)
        .bind(successor.is_auto_renew)
        .bind(successor.auto_renewal_notice_days)
        .bind(successor.status.as_str())
        .bind(successor.renewed_from_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        // Guard against a concurrent renewal of the same lease: the update
        // only lands if the original is still active and unrenewed.
        let updated = sqlx::query(
            r#"
            UPDATE leases
            SET status = 'ended', renewed_to_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'active' AND renewed_to_id IS NULL
            "#,
        )
        .bind(original_id)
        .bind(entity.id)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        if updated.rows_affected() != 1 {
            timer.record();
            return Err(StoreError::Conflict(format!(
                "lease {} is not renewable",
                original_id
            )));
        }

        tx.commit().await.map_err(store_err)?;
        timer.record();
        Ok(entity.into())
    }

    async fn find_payment_reminder_matches(
        &self,
        organization_id: Uuid,
        window: DayWindow,
    ) -> Result<Vec<Lease>, StoreError> {
        let timer = QueryTimer::new("find_payment_reminder_matches");
        let result = sqlx::query_as::<_, LeaseEntity>(
            r#"
            SELECT * FROM leases
            WHERE organization_id = $1
              AND status = 'active'
              AND paid_at IS NULL
              AND start_date >= $2
              AND start_date < $3
            "#,
        )
        .bind(organization_id)
        .bind(window.start.date_naive())
        .bind(window.end.date_naive())
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(Lease::from)
            .collect())
    }

    async fn find_lease_expiring_matches(
        &self,
        organization_id: Uuid,
        window: DayWindow,
    ) -> Result<Vec<Lease>, StoreError> {
        let timer = QueryTimer::new("find_lease_expiring_matches");
        let result = sqlx::query_as::<_, LeaseEntity>(
            r#"
            SELECT * FROM leases
            WHERE organization_id = $1
              AND status = 'active'
              AND end_date >= $2
              AND end_date < $3
            "#,
        )
        .bind(organization_id)
        .bind(window.start.date_naive())
        .bind(window.end.date_naive())
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(Lease::from)
            .collect())
    }

    async fn find_payment_late(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Lease>, StoreError> {
        let timer = QueryTimer::new("find_payment_late");
        let result = sqlx::query_as::<_, LeaseEntity>(
            r#"
            SELECT * FROM leases
            WHERE organization_id = $1
              AND status = 'draft'
              AND paid_at IS NULL
              AND start_date < $2
            "#,
        )
        .bind(organization_id)
        .bind(now.date_naive())
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(Lease::from)
            .collect())
    }
}
