//! HTTP messaging channel implementations.
//!
//! Each provider implements the domain [`ChannelSender`] trait over a shared
//! `reqwest` client. Provider rejections and transport failures are both
//! folded into [`ChannelSendResult`]; nothing here returns a hard error, the
//! dispatch router decides what a failed send means.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use domain::services::{ChannelSendResult, ChannelSender};
use domain::models::NotificationChannel;

use crate::config::ChannelsConfig;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v19.0";
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// SendGrid-style transactional email sender.
pub struct EmailSender {
    client: Client,
    api_key: String,
    from: String,
}

impl EmailSender {
    pub fn new(client: Client, api_key: String, from: String) -> Self {
        Self {
            client,
            api_key,
            from,
        }
    }
}

#[async_trait::async_trait]
impl ChannelSender for EmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> ChannelSendResult {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": recipient }] }],
            "from": { "email": self.from },
            "subject": subject.unwrap_or("Notification"),
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let provider_id = resp
                    .headers()
                    .get("x-message-id")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                ChannelSendResult::sent(provider_id)
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                warn!(status = %status, "Email provider rejected message");
                ChannelSendResult::failed(format!("email provider {}: {}", status, detail))
            }
            Err(err) => ChannelSendResult::failed(format!("email transport: {}", err)),
        }
    }
}

/// WhatsApp Business graph API sender.
pub struct WhatsAppSender {
    client: Client,
    token: String,
    phone_id: String,
}

impl WhatsAppSender {
    pub fn new(client: Client, token: String, phone_id: String) -> Self {
        Self {
            client,
            token,
            phone_id,
        }
    }
}

#[async_trait::async_trait]
impl ChannelSender for WhatsAppSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::WhatsApp
    }

    async fn send(
        &self,
        recipient: &str,
        _subject: Option<&str>,
        body: &str,
    ) -> ChannelSendResult {
        let url = format!("{}/{}/messages", WHATSAPP_API_BASE, self.phone_id);
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": recipient,
            "type": "text",
            "text": { "body": body },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let provider_id = resp
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|v| {
                        v.get("messages")
                            .and_then(|m| m.get(0))
                            .and_then(|m| m.get("id"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    });
                ChannelSendResult::sent(provider_id)
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                warn!(status = %status, "WhatsApp provider rejected message");
                ChannelSendResult::failed(format!("whatsapp provider {}: {}", status, detail))
            }
            Err(err) => ChannelSendResult::failed(format!("whatsapp transport: {}", err)),
        }
    }
}

/// Telegram bot API sender.
pub struct TelegramSender {
    client: Client,
    bot_token: String,
}

impl TelegramSender {
    pub fn new(client: Client, bot_token: String) -> Self {
        Self { client, bot_token }
    }
}

#[async_trait::async_trait]
impl ChannelSender for TelegramSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Telegram
    }

    async fn send(
        &self,
        recipient: &str,
        _subject: Option<&str>,
        body: &str,
    ) -> ChannelSendResult {
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API_BASE, self.bot_token);
        let payload = json!({
            "chat_id": recipient,
            "text": body,
        });

        let response = self.client.post(&url).json(&payload).send().await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let provider_id = resp.json::<Value>().await.ok().and_then(|v| {
                    v.get("result")
                        .and_then(|r| r.get("message_id"))
                        .and_then(Value::as_i64)
                        .map(|id| id.to_string())
                });
                ChannelSendResult::sent(provider_id)
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                warn!(status = %status, "Telegram provider rejected message");
                ChannelSendResult::failed(format!("telegram provider {}: {}", status, detail))
            }
            Err(err) => ChannelSendResult::failed(format!("telegram transport: {}", err)),
        }
    }
}

/// Build one sender per channel over a shared HTTP client.
///
/// Senders are constructed regardless of which credentials are present; the
/// dispatch router gates on the resolved credentials before any sender runs.
pub fn build_senders(
    config: &ChannelsConfig,
) -> Result<HashMap<NotificationChannel, Arc<dyn ChannelSender>>, reqwest::Error> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let mut senders: HashMap<NotificationChannel, Arc<dyn ChannelSender>> = HashMap::new();
    senders.insert(
        NotificationChannel::Email,
        Arc::new(EmailSender::new(
            client.clone(),
            config.email_api_key.clone(),
            config.email_from.clone(),
        )),
    );
    senders.insert(
        NotificationChannel::WhatsApp,
        Arc::new(WhatsAppSender::new(
            client.clone(),
            config.whatsapp_token.clone(),
            config.whatsapp_phone_id.clone(),
        )),
    );
    senders.insert(
        NotificationChannel::Telegram,
        Arc::new(TelegramSender::new(client, config.telegram_bot_token.clone())),
    );
    Ok(senders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_senders_covers_every_channel() {
        let config = ChannelsConfig::default();
        let senders = build_senders(&config).expect("client build");
        for channel in [
            NotificationChannel::Email,
            NotificationChannel::WhatsApp,
            NotificationChannel::Telegram,
        ] {
            let sender = senders.get(&channel).expect("sender present");
            assert_eq!(sender.channel(), channel);
        }
    }
}
