//! Notification rule and dispatch log repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{NewNotificationLog, NotificationLog, NotificationRule, NotificationTrigger};
use domain::services::{NotificationStore, StoreError};

use crate::entities::notification::{STATUS_FAILED, STATUS_PENDING, STATUS_SENT};
use crate::entities::{NotificationLogEntity, NotificationRuleEntity};
use crate::metrics::QueryTimer;

use super::store_err;

/// Repository for notification rules and the append-only dispatch log.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn organizations_with_active_rules(&self) -> Result<Vec<Uuid>, StoreError> {
        let timer = QueryTimer::new("organizations_with_active_rules");
        let result: Result<Vec<(Uuid,)>, _> = sqlx::query_as(
            r#"
            SELECT DISTINCT organization_id FROM notification_rules
            WHERE is_active = true
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(|row| row.0)
            .collect())
    }

    async fn active_rules(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
    ) -> Result<Vec<NotificationRule>, StoreError> {
        let timer = QueryTimer::new("find_active_notification_rules");
        let result = sqlx::query_as::<_, NotificationRuleEntity>(
            r#"
            SELECT * FROM notification_rules
            WHERE organization_id = $1 AND trigger = $2 AND is_active = true
            ORDER BY created_at
            "#,
        )
        .bind(organization_id)
        .bind(trigger.as_str())
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_err)?
            .into_iter()
            .map(NotificationRule::from)
            .collect())
    }

    async fn create_pending(
        &self,
        log: NewNotificationLog,
    ) -> Result<NotificationLog, StoreError> {
        let timer = QueryTimer::new("create_pending_notification_log");
        let result = sqlx::query_as::<_, NotificationLogEntity>(
            r#"
            INSERT INTO notification_logs (organization_id, trigger, channel, recipient,
                                           subject, body, status, related_entity_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(log.organization_id)
        .bind(log.trigger.as_str())
        .bind(log.channel.as_str())
        .bind(&log.recipient)
        .bind(&log.subject)
        .bind(&log.body)
        .bind(STATUS_PENDING)
        .bind(log.related_entity_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(NotificationLog::from).map_err(store_err)
    }

    async fn mark_sent(&self, log_id: Uuid, sent_at: DateTime<Utc>) -> Result<(), StoreError> {
        let timer = QueryTimer::new("mark_notification_sent");
        let result = sqlx::query(
            r#"
            UPDATE notification_logs
            SET status = $2, sent_at = $3
            WHERE id = $1
            "#,
        )
        .bind(log_id)
        .bind(STATUS_SENT)
        .bind(sent_at)
        .execute(&self.pool)
        .await;
        timer.record();
        let updated = result.map_err(store_err)?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "notification log {} not found",
                log_id
            )));
        }
        Ok(())
    }

    async fn mark_failed(&self, log_id: Uuid, reason: &str) -> Result<(), StoreError> {
        let timer = QueryTimer::new("mark_notification_failed");
        let result = sqlx::query(
            r#"
            UPDATE notification_logs
            SET status = $2, failed_reason = $3
            WHERE id = $1
            "#,
        )
        .bind(log_id)
        .bind(STATUS_FAILED)
        .bind(reason)
        .execute(&self.pool)
        .await;
        timer.record();
        let updated = result.map_err(store_err)?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "notification log {} not found",
                log_id
            )));
        }
        Ok(())
    }

    async fn was_notified_on(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
        lease_id: Uuid,
        day: NaiveDate,
    ) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("was_notified_on");
        let result: Result<(bool,), _> = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notification_logs
                WHERE organization_id = $1
                  AND trigger = $2
                  AND related_entity_id = $3
                  AND status <> $4
                  AND COALESCE(sent_at, created_at) >= $5::date
                  AND COALESCE(sent_at, created_at) < $5::date + INTERVAL '1 day'
            )
            "#,
        )
        .bind(organization_id)
        .bind(trigger.as_str())
        .bind(lease_id)
        .bind(STATUS_FAILED)
        .bind(day)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(|row| row.0).map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // This test verifies the NotificationRepository can be created
        // Actual database tests are integration tests
    }
}
