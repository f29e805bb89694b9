//! Tenant, unit, and contact resolution records.
//!
//! Bulk import rows reference tenants and units by external identifiers
//! (tenant email, property name + unit name). These thin records are what the
//! batch resolution queries return; full tenant/unit CRUD lives outside this
//! subsystem.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notification::NotificationChannel;

/// Tenant lifecycle status relevant to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Prospect,
    Active,
    Former,
}

impl TenantStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prospect => "prospect",
            Self::Active => "active",
            Self::Former => "former",
        }
    }

    /// Parse from a database string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "prospect" => Some(Self::Prospect),
            "active" => Some(Self::Active),
            "former" => Some(Self::Former),
            _ => None,
        }
    }
}

/// Tenant resolved by email during bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRef {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub status: TenantStatus,
}

/// Unit resolved by (property name, unit name) during bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRef {
    pub id: Uuid,
    pub property_id: Uuid,
    pub property_name: String,
    pub name: String,
    /// Units can be administratively marked unavailable (renovation, sale),
    /// independent of lease overlap.
    pub is_available: bool,
}

/// Recipient contact info for one lease's tenant, resolved before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContact {
    pub tenant_id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub preferred_channel: NotificationChannel,
}

impl TenantContact {
    /// The recipient address for the preferred channel, if present.
    pub fn recipient(&self) -> Option<&str> {
        match self.preferred_channel {
            NotificationChannel::Email => self.email.as_deref(),
            NotificationChannel::WhatsApp | NotificationChannel::Telegram => {
                self.phone.as_deref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_status_round_trip() {
        for status in [TenantStatus::Prospect, TenantStatus::Active, TenantStatus::Former] {
            assert_eq!(TenantStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TenantStatus::parse("evicted"), None);
    }

    #[test]
    fn test_contact_recipient_follows_preferred_channel() {
        let contact = TenantContact {
            tenant_id: Uuid::nil(),
            full_name: "Ada Tenant".into(),
            email: Some("ada@example.com".into()),
            phone: Some("+15550100".into()),
            preferred_channel: NotificationChannel::WhatsApp,
        };
        assert_eq!(contact.recipient(), Some("+15550100"));

        let contact = TenantContact {
            preferred_channel: NotificationChannel::Email,
            ..contact
        };
        assert_eq!(contact.recipient(), Some("ada@example.com"));
    }

    #[test]
    fn test_contact_recipient_missing() {
        let contact = TenantContact {
            tenant_id: Uuid::nil(),
            full_name: "No Phone".into(),
            email: Some("x@example.com".into()),
            phone: None,
            preferred_channel: NotificationChannel::Telegram,
        };
        assert_eq!(contact.recipient(), None);
    }
}
