//! Channel-polymorphic notification dispatch.
//!
//! Every dispatch writes its outcome to the notification log: a pending row
//! goes in before the provider call and is flipped to sent or failed
//! afterwards. The one exception is missing credentials, which fails closed
//! before any row or network call happens.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use domain::models::{NewNotificationLog, NotificationChannel, NotificationTrigger};
use domain::services::{ChannelSender, CredentialsResolver, NotificationStore};
use shared::template;

use crate::error::EngineError;

/// Failure reasons are truncated before they land in the log.
const MAX_FAILURE_REASON_LEN: usize = 500;

/// One message to route to a provider.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub organization_id: Uuid,
    pub trigger: NotificationTrigger,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body_template: String,
    pub variables: HashMap<String, String>,
    pub related_entity_id: Option<Uuid>,
}

/// What happened to one dispatch request.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Provider accepted; the log row is marked sent.
    Sent { log_id: Uuid },
    /// Provider rejected or transport failed; the log row is marked failed.
    Failed { log_id: Uuid, reason: String },
    /// The organization has no credentials for the channel. No log row.
    MissingCredentials,
}

/// Routes rendered messages to the channel senders and keeps the dispatch
/// log consistent around each attempt.
pub struct DispatchRouter {
    notifications: Arc<dyn NotificationStore>,
    credentials: Arc<dyn CredentialsResolver>,
    senders: HashMap<NotificationChannel, Arc<dyn ChannelSender>>,
}

impl DispatchRouter {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        credentials: Arc<dyn CredentialsResolver>,
        senders: HashMap<NotificationChannel, Arc<dyn ChannelSender>>,
    ) -> Self {
        Self {
            notifications,
            credentials,
            senders,
        }
    }

    /// Render and send one message.
    ///
    /// Returns `Err` only for store failures; provider-side failures come
    /// back as [`DispatchOutcome::Failed`] with the log row already updated.
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, EngineError> {
        let credentials = self.credentials.resolve(request.organization_id).await;
        if !credentials.supports(request.channel) {
            debug!(
                organization_id = %request.organization_id,
                channel = request.channel.as_str(),
                "Skipping dispatch, no credentials for channel"
            );
            return Ok(DispatchOutcome::MissingCredentials);
        }
        let Some(sender) = self.senders.get(&request.channel) else {
            return Ok(DispatchOutcome::MissingCredentials);
        };

        let subject = request
            .subject
            .as_deref()
            .map(|s| template::render(s, &request.variables));
        let body = template::render(&request.body_template, &request.variables);
        // Unmatched placeholders survive rendering as literal text; surface
        // them so a misconfigured rule template is visible in the logs.
        let unresolved = template::placeholders(&body);
        if !unresolved.is_empty() {
            warn!(
                organization_id = %request.organization_id,
                trigger = request.trigger.as_str(),
                placeholders = ?unresolved,
                "Template placeholders had no matching variables"
            );
        }

        let log = self
            .notifications
            .create_pending(NewNotificationLog {
                organization_id: request.organization_id,
                trigger: request.trigger,
                channel: request.channel,
                recipient: request.recipient.clone(),
                subject: subject.clone(),
                body: body.clone(),
                related_entity_id: request.related_entity_id,
            })
            .await?;

        let result = sender.send(&request.recipient, subject.as_deref(), &body).await;

        if result.success {
            self.notifications.mark_sent(log.id, now).await?;
            debug!(log_id = %log.id, channel = request.channel.as_str(), "Notification sent");
            Ok(DispatchOutcome::Sent { log_id: log.id })
        } else {
            let mut reason = result
                .error
                .unwrap_or_else(|| "unknown provider error".to_string());
            if reason.len() > MAX_FAILURE_REASON_LEN {
                let mut cut = MAX_FAILURE_REASON_LEN;
                while !reason.is_char_boundary(cut) {
                    cut -= 1;
                }
                reason.truncate(cut);
            }
            self.notifications.mark_failed(log.id, &reason).await?;
            warn!(
                log_id = %log.id,
                channel = request.channel.as_str(),
                reason = %reason,
                "Notification send failed"
            );
            Ok(DispatchOutcome::Failed {
                log_id: log.id,
                reason,
            })
        }
    }
}
