//! Tenant and unit resolution entity definitions.

use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{NotificationChannel, TenantContact, TenantRef, TenantStatus, UnitRef};

/// Row returned by the tenant email resolution query.
#[derive(Debug, Clone, FromRow)]
pub struct TenantRefEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub status: String,
}

impl From<TenantRefEntity> for TenantRef {
    fn from(entity: TenantRefEntity) -> Self {
        TenantRef {
            id: entity.id,
            organization_id: entity.organization_id,
            email: entity.email,
            full_name: entity.full_name,
            status: TenantStatus::parse(&entity.status).unwrap_or(TenantStatus::Prospect),
        }
    }
}

/// Row returned by the unit name resolution query (joined with properties).
#[derive(Debug, Clone, FromRow)]
pub struct UnitRefEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub property_name: String,
    pub name: String,
    pub is_available: bool,
}

impl From<UnitRefEntity> for UnitRef {
    fn from(entity: UnitRefEntity) -> Self {
        UnitRef {
            id: entity.id,
            property_id: entity.property_id,
            property_name: entity.property_name,
            name: entity.name,
            is_available: entity.is_available,
        }
    }
}

/// Row returned by the tenant contact query.
#[derive(Debug, Clone, FromRow)]
pub struct TenantContactEntity {
    pub tenant_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_channel: String,
}

impl From<TenantContactEntity> for TenantContact {
    fn from(entity: TenantContactEntity) -> Self {
        TenantContact {
            tenant_id: entity.tenant_id,
            full_name: entity.full_name,
            email: entity.email,
            phone: entity.phone,
            preferred_channel: NotificationChannel::parse(&entity.preferred_channel)
                .unwrap_or(NotificationChannel::Email),
        }
    }
}
