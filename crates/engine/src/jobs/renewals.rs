//! Auto-renewal background job.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::services::AutoRenewalService;

use super::scheduler::{Job, JobFrequency};

/// Periodically renews leases whose notice deadline has passed.
pub struct AutoRenewalJob {
    service: Arc<AutoRenewalService>,
    interval_minutes: u64,
}

impl AutoRenewalJob {
    pub fn new(service: Arc<AutoRenewalService>, interval_minutes: u64) -> Self {
        Self {
            service,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for AutoRenewalJob {
    fn name(&self) -> &'static str {
        "auto_renewals"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let now = Utc::now();
        let report = self
            .service
            .process_auto_renewals(None, now)
            .await
            .map_err(|e| format!("Auto-renewal run failed: {}", e))?;

        if !report.is_clean() {
            warn!(
                failed = report.failed,
                succeeded = report.succeeded,
                "Some leases failed to renew"
            );
        } else if report.succeeded > 0 {
            info!(renewed = report.succeeded, "Leases auto-renewed");
        }

        Ok(())
    }
}
