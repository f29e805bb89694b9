//! Notification rule and log entity definitions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{
    NotificationChannel, NotificationLog, NotificationLogStatus, NotificationRule,
    NotificationTrigger,
};

/// Log status values as stored.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

/// Database entity for the `notification_rules` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRuleEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub trigger: String,
    pub days_offset: i32,
    pub subject: Option<String>,
    pub body_template: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NotificationRuleEntity> for NotificationRule {
    fn from(entity: NotificationRuleEntity) -> Self {
        NotificationRule {
            id: entity.id,
            organization_id: entity.organization_id,
            trigger: NotificationTrigger::parse(&entity.trigger)
                .unwrap_or(NotificationTrigger::Manual),
            days_offset: entity.days_offset,
            subject: entity.subject,
            body_template: entity.body_template,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database entity for the `notification_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationLogEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub trigger: String,
    pub channel: String,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
    pub status: String,
    pub related_entity_id: Option<Uuid>,
    pub sent_at: Option<DateTime<Utc>>,
    pub failed_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationLogEntity> for NotificationLog {
    fn from(entity: NotificationLogEntity) -> Self {
        NotificationLog {
            id: entity.id,
            organization_id: entity.organization_id,
            trigger: NotificationTrigger::parse(&entity.trigger)
                .unwrap_or(NotificationTrigger::Manual),
            channel: NotificationChannel::parse(&entity.channel)
                .unwrap_or(NotificationChannel::Email),
            recipient: entity.recipient,
            subject: entity.subject,
            body: entity.body,
            status: NotificationLogStatus::parse(&entity.status)
                .unwrap_or(NotificationLogStatus::Pending),
            related_entity_id: entity.related_entity_id,
            sent_at: entity.sent_at,
            failed_reason: entity.failed_reason,
            created_at: entity.created_at,
        }
    }
}
