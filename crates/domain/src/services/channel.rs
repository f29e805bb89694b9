//! Channel sender and credentials resolution seams.
//!
//! The dispatch router is channel-polymorphic: each messaging provider
//! implements [`ChannelSender`] behind its own HTTP client, and tests plug in
//! [`MockChannelSender`]. Organization credentials are resolved by an
//! external collaborator before this subsystem runs; [`CredentialsResolver`]
//! is the seam it hands them through.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{ChannelCredentials, NotificationChannel};

/// Result of one provider send attempt.
#[derive(Debug, Clone)]
pub struct ChannelSendResult {
    pub success: bool,
    /// Provider-side message id, when the provider returns one.
    pub provider_id: Option<String>,
    /// Provider rejection or transport error message.
    pub error: Option<String>,
}

impl ChannelSendResult {
    pub fn sent(provider_id: Option<String>) -> Self {
        Self {
            success: true,
            provider_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_id: None,
            error: Some(error.into()),
        }
    }
}

/// One outbound messaging channel.
#[async_trait::async_trait]
pub trait ChannelSender: Send + Sync {
    /// The channel this sender serves.
    fn channel(&self) -> NotificationChannel;

    /// Send one rendered message. Provider rejections come back as a failed
    /// result, not an error; transport failures are also folded into the
    /// result by the implementation.
    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> ChannelSendResult;
}

/// Resolves organization-scoped channel credentials.
#[async_trait::async_trait]
pub trait CredentialsResolver: Send + Sync {
    async fn resolve(&self, organization_id: Uuid) -> ChannelCredentials;
}

/// Static resolver returning the same credentials for every organization.
/// Used for single-tenant deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialsResolver {
    pub credentials: ChannelCredentials,
}

impl StaticCredentialsResolver {
    pub fn new(credentials: ChannelCredentials) -> Self {
        Self { credentials }
    }
}

#[async_trait::async_trait]
impl CredentialsResolver for StaticCredentialsResolver {
    async fn resolve(&self, _organization_id: Uuid) -> ChannelCredentials {
        self.credentials.clone()
    }
}

/// Mock channel sender for development and testing.
///
/// Records every send and can simulate provider failures.
#[derive(Debug, Default)]
pub struct MockChannelSender {
    channel: Option<NotificationChannel>,
    /// Whether to simulate provider rejections.
    pub simulate_failure: bool,
    send_count: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockChannelSender {
    /// Create a mock sender for the given channel.
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel: Some(channel),
            simulate_failure: false,
            send_count: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock sender that simulates provider rejections.
    pub fn failing(channel: NotificationChannel) -> Self {
        Self {
            simulate_failure: true,
            ..Self::new(channel)
        }
    }

    /// Number of send attempts made so far.
    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Recipient/body pairs seen so far.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mock sent lock").clone()
    }
}

#[async_trait::async_trait]
impl ChannelSender for MockChannelSender {
    fn channel(&self) -> NotificationChannel {
        self.channel.unwrap_or(NotificationChannel::Email)
    }

    async fn send(
        &self,
        recipient: &str,
        _subject: Option<&str>,
        body: &str,
    ) -> ChannelSendResult {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .expect("mock sent lock")
            .push((recipient.to_string(), body.to_string()));

        if self.simulate_failure {
            tracing::warn!(recipient = %recipient, "Mock channel sender simulating failure");
            return ChannelSendResult::failed("Simulated provider rejection");
        }

        tracing::info!(
            recipient = %recipient,
            body_len = body.len(),
            "Mock: would send message"
        );
        ChannelSendResult::sent(Some(format!("mock-{}", self.send_count())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_sender_records_sends() {
        let sender = MockChannelSender::new(NotificationChannel::Email);
        let result = sender.send("ada@example.com", Some("Hi"), "body").await;
        assert!(result.success);
        assert_eq!(sender.send_count(), 1);
        assert_eq!(
            sender.sent_messages(),
            vec![("ada@example.com".to_string(), "body".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mock_sender_failure() {
        let sender = MockChannelSender::failing(NotificationChannel::Telegram);
        let result = sender.send("12345", None, "body").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Simulated provider rejection"));
    }

    #[tokio::test]
    async fn test_static_resolver_same_for_all_orgs() {
        let resolver = StaticCredentialsResolver::new(ChannelCredentials {
            email_api_key: Some("key".into()),
            ..Default::default()
        });
        let a = resolver.resolve(Uuid::new_v4()).await;
        let b = resolver.resolve(Uuid::new_v4()).await;
        assert!(a.supports(NotificationChannel::Email));
        assert!(b.supports(NotificationChannel::Email));
    }
}
