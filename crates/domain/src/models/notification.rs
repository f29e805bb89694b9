//! Notification rule, log, and channel domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business event a notification rule reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTrigger {
    PaymentReminder,
    PaymentLate,
    PaymentConfirmed,
    LeaseExpiring,
    LeaseExpired,
    Manual,
}

impl NotificationTrigger {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentReminder => "payment_reminder",
            Self::PaymentLate => "payment_late",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::LeaseExpiring => "lease_expiring",
            Self::LeaseExpired => "lease_expired",
            Self::Manual => "manual",
        }
    }

    /// Parse from a database string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "payment_reminder" => Some(Self::PaymentReminder),
            "payment_late" => Some(Self::PaymentLate),
            "payment_confirmed" => Some(Self::PaymentConfirmed),
            "lease_expiring" => Some(Self::LeaseExpiring),
            "lease_expired" => Some(Self::LeaseExpired),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Triggers the scheduler tick evaluates. PaymentConfirmed, LeaseExpired,
    /// and Manual fire from event-driven flows outside the tick.
    pub const SCHEDULABLE: [Self; 3] = [
        Self::PaymentReminder,
        Self::PaymentLate,
        Self::LeaseExpiring,
    ];

    /// Whether the scheduler tick evaluates this trigger.
    pub fn is_schedulable(&self) -> bool {
        Self::SCHEDULABLE.contains(self)
    }
}

impl std::fmt::Display for NotificationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outbound message channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    WhatsApp,
    Telegram,
}

impl NotificationChannel {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::WhatsApp => "whatsapp",
            Self::Telegram => "telegram",
        }
    }

    /// Parse from a database string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(Self::Email),
            "whatsapp" => Some(Self::WhatsApp),
            "telegram" => Some(Self::Telegram),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Organization-scoped rule mapping a trigger and day offset to an automated
/// outbound message. Rules are read-only snapshots during a scheduler tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRule {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub trigger: NotificationTrigger,
    /// Sign and meaning depend on the trigger: for PaymentReminder and
    /// LeaseExpiring the matched day is `today + days_offset`. PaymentLate
    /// ignores the offset entirely.
    pub days_offset: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body_template: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Delivery state of a notification log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLogStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationLogStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parse from a database string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One dispatch attempt. Append-only audit trail; rows are created pending
/// before the network call and always transition to sent or failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLog {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub trigger: NotificationTrigger,
    pub channel: NotificationChannel,
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub status: NotificationLogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a pending notification log row.
#[derive(Debug, Clone)]
pub struct NewNotificationLog {
    pub organization_id: Uuid,
    pub trigger: NotificationTrigger,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
    pub related_entity_id: Option<Uuid>,
}

/// Organization-scoped channel secrets, resolved by the caller before the
/// dispatch router is invoked. A channel whose credentials are absent fails
/// closed without a network call.
#[derive(Debug, Clone, Default)]
pub struct ChannelCredentials {
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub whatsapp_token: Option<String>,
    pub whatsapp_phone_id: Option<String>,
    pub telegram_bot_token: Option<String>,
}

impl ChannelCredentials {
    /// Whether the given channel can be used with these credentials.
    pub fn supports(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Email => self.email_api_key.is_some(),
            NotificationChannel::WhatsApp => {
                self.whatsapp_token.is_some() && self.whatsapp_phone_id.is_some()
            }
            NotificationChannel::Telegram => self.telegram_bot_token.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_round_trip() {
        for trigger in [
            NotificationTrigger::PaymentReminder,
            NotificationTrigger::PaymentLate,
            NotificationTrigger::PaymentConfirmed,
            NotificationTrigger::LeaseExpiring,
            NotificationTrigger::LeaseExpired,
            NotificationTrigger::Manual,
        ] {
            assert_eq!(NotificationTrigger::parse(trigger.as_str()), Some(trigger));
        }
    }

    #[test]
    fn test_schedulable_triggers() {
        assert!(NotificationTrigger::PaymentReminder.is_schedulable());
        assert!(NotificationTrigger::PaymentLate.is_schedulable());
        assert!(NotificationTrigger::LeaseExpiring.is_schedulable());
        assert!(!NotificationTrigger::PaymentConfirmed.is_schedulable());
        assert!(!NotificationTrigger::LeaseExpired.is_schedulable());
        assert!(!NotificationTrigger::Manual.is_schedulable());
    }

    #[test]
    fn test_channel_round_trip() {
        for channel in [
            NotificationChannel::Email,
            NotificationChannel::WhatsApp,
            NotificationChannel::Telegram,
        ] {
            assert_eq!(NotificationChannel::parse(channel.as_str()), Some(channel));
        }
        assert_eq!(NotificationChannel::parse("sms"), None);
    }

    #[test]
    fn test_credentials_fail_closed() {
        let creds = ChannelCredentials::default();
        assert!(!creds.supports(NotificationChannel::Email));
        assert!(!creds.supports(NotificationChannel::WhatsApp));
        assert!(!creds.supports(NotificationChannel::Telegram));
    }

    #[test]
    fn test_credentials_whatsapp_requires_both() {
        let creds = ChannelCredentials {
            whatsapp_token: Some("token".into()),
            ..Default::default()
        };
        assert!(!creds.supports(NotificationChannel::WhatsApp));

        let creds = ChannelCredentials {
            whatsapp_token: Some("token".into()),
            whatsapp_phone_id: Some("123".into()),
            ..Default::default()
        };
        assert!(creds.supports(NotificationChannel::WhatsApp));
    }

    #[test]
    fn test_log_status_round_trip() {
        for status in [
            NotificationLogStatus::Pending,
            NotificationLogStatus::Sent,
            NotificationLogStatus::Failed,
        ] {
            assert_eq!(NotificationLogStatus::parse(status.as_str()), Some(status));
        }
    }
}
