//! Notification tick background job.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::services::NotificationOrchestrator;

use super::scheduler::{Job, JobFrequency};

/// Periodically evaluates notification rules and dispatches matches.
pub struct NotificationTickJob {
    orchestrator: Arc<NotificationOrchestrator>,
    interval_minutes: u64,
}

impl NotificationTickJob {
    pub fn new(orchestrator: Arc<NotificationOrchestrator>, interval_minutes: u64) -> Self {
        Self {
            orchestrator,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for NotificationTickJob {
    fn name(&self) -> &'static str {
        "notification_tick"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        // The only wall-clock read; everything below takes "now" explicitly.
        let now = Utc::now();
        let report = self
            .orchestrator
            .run_tick(now)
            .await
            .map_err(|e| format!("Notification tick failed: {}", e))?;

        if report.total_sent() > 0 || report.total_failed() > 0 {
            info!(
                organizations = report.processed_organizations,
                sent = report.total_sent(),
                failed = report.total_failed(),
                "Notification tick dispatched messages"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_job_frequency_follows_config() {
        let freq = JobFrequency::Minutes(15);
        assert_eq!(freq.duration(), Duration::from_secs(900));
    }
}
