//! Tenant/unit resolution and activity log repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{NewActivity, TenantContact, TenantRef, UnitRef};
use domain::services::{DirectoryStore, StoreError};

use crate::entities::{TenantContactEntity, TenantRefEntity, UnitRefEntity};
use crate::metrics::QueryTimer;

use super::store_err;

/// Repository for tenant/unit resolution and audit appends.
#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Creates a new DirectoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for DirectoryRepository {
    async fn find_tenants_by_emails(
        &self,
        organization_id: Uuid,
        emails: &[String],
    ) -> Result<Vec<TenantRef>, StoreError> {
        let timer = QueryTimer::new("find_tenants_by_emails");
        let result = sqlx::query_as::<_, TenantRefEntity>(
            r#"
            SELECT id, organization_id, email, full_name, status
            FROM tenants
            WHERE organization_id = $1 AND LOWER(email) = ANY($2)
            "#,
        )
        .bind(organization_id)
        .bind(
            emails
                .iter()
                .map(|e| e.to_lowercase())
                .collect::<Vec<String>>(),
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(TenantRef::from)
            .collect())
    }

    async fn find_units_by_names(
        &self,
        organization_id: Uuid,
        names: &[(String, String)],
    ) -> Result<Vec<UnitRef>, StoreError> {
        let timer = QueryTimer::new("find_units_by_names");
        let property_names: Vec<String> = names.iter().map(|(p, _)| p.clone()).collect();
        let unit_names: Vec<String> = names.iter().map(|(_, u)| u.clone()).collect();
        // The requested pairs are unnested into a virtual table so the whole
        // set resolves in one round-trip.
        let result = sqlx::query_as::<_, UnitRefEntity>(
            r#"
            SELECT u.id, u.property_id, p.name AS property_name, u.name, u.is_available
            FROM units u
            JOIN properties p ON p.id = u.property_id
            JOIN UNNEST($2::text[], $3::text[]) AS req(property_name, unit_name)
              ON p.name = req.property_name AND u.name = req.unit_name
            WHERE p.organization_id = $1
            "#,
        )
        .bind(organization_id)
        .bind(property_names)
        .bind(unit_names)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(UnitRef::from)
            .collect())
    }

    async fn find_unit(&self, unit_id: Uuid) -> Result<Option<UnitRef>, StoreError> {
        let timer = QueryTimer::new("find_unit_by_id");
        let result = sqlx::query_as::<_, UnitRefEntity>(
            r#"
            SELECT u.id, u.property_id, p.name AS property_name, u.name, u.is_available
            FROM units u
            JOIN properties p ON p.id = u.property_id
            WHERE u.id = $1
            "#,
        )
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_err)?.map(UnitRef::from))
    }

    async fn contact_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantContact>, StoreError> {
        let timer = QueryTimer::new("find_tenant_contact");
        let result = sqlx::query_as::<_, TenantContactEntity>(
            r#"
            SELECT id AS tenant_id, full_name, email, phone, preferred_channel
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_err)?.map(TenantContact::from))
    }

    async fn mark_tenant_active(&self, tenant_id: Uuid) -> Result<(), StoreError> {
        let timer = QueryTimer::new("mark_tenant_active");
        let result = sqlx::query(
            r#"
            UPDATE tenants SET status = 'active', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(tenant_id)
        .execute(&self.pool)
        .await;
        timer.record();
        let updated = result.map_err(store_err)?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "tenant {} not found",
                tenant_id
            )));
        }
        Ok(())
    }

    async fn record_activity(&self, activity: NewActivity) -> Result<(), StoreError> {
        let timer = QueryTimer::new("record_activity");
        let result = sqlx::query(
            r#"
            INSERT INTO activities (organization_id, action, entity_type, entity_id, detail)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(activity.organization_id)
        .bind(&activity.action)
        .bind(&activity.entity_type)
        .bind(activity.entity_id)
        .bind(&activity.detail)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ()).map_err(store_err)
    }
}
