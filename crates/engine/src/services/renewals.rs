//! Auto-renewal batch runner.
//!
//! Renews every eligible lease in sequence. The eligibility pre-filter lives
//! in the store; the date deadline is re-checked in-process with the explicit
//! `now` so the decision stays deterministic and testable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::NewActivity;
use domain::services::renewal::{should_auto_renew, successor_lease};
use domain::services::{BatchReport, DirectoryStore, LeaseStore};

use crate::error::EngineError;

/// Runs the auto-renewal pass over eligible leases.
pub struct AutoRenewalService {
    leases: Arc<dyn LeaseStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl AutoRenewalService {
    pub fn new(leases: Arc<dyn LeaseStore>, directory: Arc<dyn DirectoryStore>) -> Self {
        Self { leases, directory }
    }

    /// Renew every lease whose notice deadline has been reached.
    ///
    /// Scoped to one organization when `organization_id` is set. Each lease
    /// renews in its own transaction; one failure is recorded in the report
    /// and never aborts the rest.
    pub async fn process_auto_renewals(
        &self,
        organization_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<BatchReport, EngineError> {
        let candidates = self.leases.find_renewal_candidates(organization_id).await?;
        let mut report = BatchReport::new();

        for lease in candidates {
            if !should_auto_renew(&lease, now) {
                continue;
            }

            let successor = successor_lease(&lease);
            match self.leases.create_renewal(lease.id, successor).await {
                Ok(created) => {
                    info!(
                        lease_id = %lease.id,
                        successor_id = %created.id,
                        end_date = %created.end_date,
                        "Lease auto-renewed"
                    );
                    if let Err(err) = self
                        .directory
                        .record_activity(NewActivity::lease_renewed(
                            lease.organization_id,
                            lease.id,
                            created.id,
                        ))
                        .await
                    {
                        // The renewal itself committed; a lost audit row is
                        // logged but not counted as a renewal failure.
                        warn!(lease_id = %lease.id, error = %err, "Failed to record renewal activity");
                    }
                    report.record_success();
                }
                Err(err) => {
                    warn!(lease_id = %lease.id, error = %err, "Auto-renewal failed");
                    report.record_failure(lease.id, err.to_string());
                }
            }
        }

        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "Auto-renewal run completed"
        );
        Ok(report)
    }
}
