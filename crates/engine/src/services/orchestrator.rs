//! Scheduled notification tick.
//!
//! One tick walks every organization with at least one active rule, evaluates
//! the schedulable triggers against the lease store, and dispatches a message
//! per matched lease. Failures are recorded per lease and never abort the
//! rest of the tick.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::{Lease, NotificationRule, NotificationTrigger, TenantContact};
use domain::services::rules::target_window;
use domain::services::{DirectoryStore, LeaseStore, NotificationStore};
use shared::validation::DATE_FORMAT;

use crate::error::EngineError;
use crate::services::dispatch::{DispatchOutcome, DispatchRequest, DispatchRouter};

/// Outcome of one (organization, trigger) evaluation.
#[derive(Debug, Clone)]
pub struct TriggerRunResult {
    pub organization_id: Uuid,
    pub trigger: NotificationTrigger,
    /// Leases a dispatch was attempted for, after dedup and the
    /// already-notified skip.
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    /// One `"{lease_id}: {error}"` entry per failure.
    pub errors: Vec<String>,
}

impl TriggerRunResult {
    fn new(organization_id: Uuid, trigger: NotificationTrigger) -> Self {
        Self {
            organization_id,
            trigger,
            processed: 0,
            sent: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    fn record_failure(&mut self, lease_id: Uuid, error: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(format!("{}: {}", lease_id, error));
    }

    fn is_empty(&self) -> bool {
        self.processed == 0 && self.errors.is_empty()
    }
}

/// Outcome of one full tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub processed_organizations: usize,
    pub results: Vec<TriggerRunResult>,
}

impl TickReport {
    pub fn total_sent(&self) -> usize {
        self.results.iter().map(|r| r.sent).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.results.iter().map(|r| r.failed).sum()
    }
}

/// Evaluates notification rules and drives the dispatch router.
pub struct NotificationOrchestrator {
    leases: Arc<dyn LeaseStore>,
    notifications: Arc<dyn NotificationStore>,
    directory: Arc<dyn DirectoryStore>,
    router: DispatchRouter,
}

impl NotificationOrchestrator {
    pub fn new(
        leases: Arc<dyn LeaseStore>,
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn DirectoryStore>,
        router: DispatchRouter,
    ) -> Self {
        Self {
            leases,
            notifications,
            directory,
            router,
        }
    }

    /// Run one tick at the given instant.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<TickReport, EngineError> {
        let organizations = self.notifications.organizations_with_active_rules().await?;
        let mut report = TickReport {
            processed_organizations: organizations.len(),
            results: Vec::new(),
        };

        for organization_id in organizations {
            for trigger in NotificationTrigger::SCHEDULABLE {
                let result = self.run_trigger(organization_id, trigger, now).await;
                if !result.is_empty() {
                    report.results.push(result);
                }
            }
        }

        info!(
            organizations = report.processed_organizations,
            sent = report.total_sent(),
            failed = report.total_failed(),
            "Notification tick completed"
        );
        Ok(report)
    }

    async fn run_trigger(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
        now: DateTime<Utc>,
    ) -> TriggerRunResult {
        let mut result = TriggerRunResult::new(organization_id, trigger);

        let rules = match self.notifications.active_rules(organization_id, trigger).await {
            Ok(rules) => rules,
            Err(err) => {
                warn!(
                    organization_id = %organization_id,
                    trigger = trigger.as_str(),
                    error = %err,
                    "Failed to load notification rules"
                );
                result.errors.push(err.to_string());
                return result;
            }
        };

        // One lease gets at most one message per trigger per tick, even when
        // several rules match it.
        let mut seen: HashSet<Uuid> = HashSet::new();

        for rule in rules {
            let matches = match self.matching_leases(organization_id, trigger, &rule, now).await {
                Ok(matches) => matches,
                Err(err) => {
                    result.errors.push(err.to_string());
                    continue;
                }
            };

            for lease in matches {
                if !seen.insert(lease.id) {
                    continue;
                }

                // PaymentLate intentionally re-fires every tick; the offset
                // triggers are deduplicated per calendar day.
                if trigger != NotificationTrigger::PaymentLate {
                    match self
                        .notifications
                        .was_notified_on(organization_id, trigger, lease.id, now.date_naive())
                        .await
                    {
                        Ok(true) => continue,
                        Ok(false) => {}
                        Err(err) => {
                            result.record_failure(lease.id, err);
                            continue;
                        }
                    }
                }

                result.processed += 1;
                match self.notify_lease(organization_id, trigger, &rule, &lease, now).await {
                    Ok(DispatchOutcome::Sent { .. }) => result.sent += 1,
                    Ok(DispatchOutcome::Failed { reason, .. }) => {
                        result.record_failure(lease.id, reason);
                    }
                    Ok(DispatchOutcome::MissingCredentials) => {
                        result.record_failure(lease.id, "no credentials for channel");
                    }
                    Err(err) => result.record_failure(lease.id, err),
                }
            }
        }

        result
    }

    async fn matching_leases(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
        rule: &NotificationRule,
        now: DateTime<Utc>,
    ) -> Result<Vec<Lease>, EngineError> {
        let leases = match trigger {
            NotificationTrigger::PaymentReminder => {
                let window = target_window(now.date_naive(), rule.days_offset);
                self.leases
                    .find_payment_reminder_matches(organization_id, window)
                    .await?
            }
            NotificationTrigger::LeaseExpiring => {
                let window = target_window(now.date_naive(), rule.days_offset);
                self.leases
                    .find_lease_expiring_matches(organization_id, window)
                    .await?
            }
            NotificationTrigger::PaymentLate => {
                self.leases.find_payment_late(organization_id, now).await?
            }
            _ => Vec::new(),
        };
        Ok(leases)
    }

    async fn notify_lease(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
        rule: &NotificationRule,
        lease: &Lease,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, EngineError> {
        let contact = self
            .directory
            .contact_for_tenant(lease.tenant_id)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound(format!("no contact for tenant {}", lease.tenant_id))
            })?;

        let recipient = contact
            .recipient()
            .ok_or_else(|| {
                EngineError::Dispatch(format!(
                    "tenant {} has no {} recipient",
                    lease.tenant_id,
                    contact.preferred_channel.as_str()
                ))
            })?
            .to_string();

        let variables = self.lease_variables(lease, &contact).await?;

        self.router
            .dispatch(
                DispatchRequest {
                    organization_id,
                    trigger,
                    channel: contact.preferred_channel,
                    recipient,
                    subject: rule.subject.clone(),
                    body_template: rule.body_template.clone(),
                    variables,
                    related_entity_id: Some(lease.id),
                },
                now,
            )
            .await
    }

    async fn lease_variables(
        &self,
        lease: &Lease,
        contact: &TenantContact,
    ) -> Result<HashMap<String, String>, EngineError> {
        let unit_name = self
            .directory
            .find_unit(lease.unit_id)
            .await?
            .map(|unit| unit.name)
            .unwrap_or_else(|| lease.unit_id.to_string());

        let mut variables = HashMap::new();
        variables.insert("tenantName".to_string(), contact.full_name.clone());
        variables.insert("unitName".to_string(), unit_name);
        variables.insert(
            "startDate".to_string(),
            lease.start_date.format(DATE_FORMAT).to_string(),
        );
        variables.insert(
            "endDate".to_string(),
            lease.end_date.format(DATE_FORMAT).to_string(),
        );
        variables.insert("rentAmount".to_string(), lease.rent_amount.to_string());
        Ok(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use domain::models::{
        ChannelCredentials, LeaseStatus, NotificationChannel, NotificationLogStatus, PaymentCycle,
        UnitRef,
    };
    use domain::services::{
        ChannelSender, MemoryDirectoryStore, MemoryLeaseStore, MemoryNotificationStore,
        MockChannelSender, StaticCredentialsResolver,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lease(org: Uuid, status: LeaseStatus, start: NaiveDate, end: NaiveDate) -> Lease {
        Lease {
            id: Uuid::new_v4(),
            organization_id: org,
            tenant_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            payment_cycle: PaymentCycle::Monthly,
            rent_amount: 120_000,
            deposit_amount: 0,
            grace_period_days: 0,
            is_auto_renew: false,
            auto_renewal_notice_days: None,
            status,
            renewed_from_id: None,
            renewed_to_id: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rule(org: Uuid, trigger: NotificationTrigger, days_offset: i32) -> NotificationRule {
        NotificationRule {
            id: Uuid::new_v4(),
            organization_id: org,
            trigger,
            days_offset,
            subject: Some("Heads up, {{tenantName}}".into()),
            body_template: "Unit {{unitName}}: due {{startDate}}, rent {{rentAmount}}".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn contact(tenant_id: Uuid) -> TenantContact {
        TenantContact {
            tenant_id,
            full_name: "Ada Tenant".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            preferred_channel: NotificationChannel::Email,
        }
    }

    struct Fixture {
        leases: Arc<MemoryLeaseStore>,
        notifications: Arc<MemoryNotificationStore>,
        directory: Arc<MemoryDirectoryStore>,
        orchestrator: NotificationOrchestrator,
    }

    fn fixture() -> Fixture {
        let leases = Arc::new(MemoryLeaseStore::new());
        let notifications = Arc::new(MemoryNotificationStore::new());
        let directory = Arc::new(MemoryDirectoryStore::new());

        let mut senders: HashMap<NotificationChannel, Arc<dyn ChannelSender>> = HashMap::new();
        senders.insert(
            NotificationChannel::Email,
            Arc::new(MockChannelSender::new(NotificationChannel::Email)),
        );
        let router = DispatchRouter::new(
            Arc::clone(&notifications) as Arc<dyn NotificationStore>,
            Arc::new(StaticCredentialsResolver::new(ChannelCredentials {
                email_api_key: Some("key".into()),
                email_from: Some("noreply@example.com".into()),
                ..Default::default()
            })),
            senders,
        );

        let orchestrator = NotificationOrchestrator::new(
            Arc::clone(&leases) as Arc<dyn LeaseStore>,
            Arc::clone(&notifications) as Arc<dyn NotificationStore>,
            Arc::clone(&directory) as Arc<dyn DirectoryStore>,
            router,
        );

        Fixture {
            leases,
            notifications,
            directory,
            orchestrator,
        }
    }

    fn seed_lease(fixture: &Fixture, lease: &Lease) {
        fixture.leases.insert(lease.clone());
        fixture.directory.insert_contact(contact(lease.tenant_id));
        fixture.directory.insert_unit(UnitRef {
            id: lease.unit_id,
            property_id: Uuid::new_v4(),
            property_name: "Riverside".into(),
            name: "A-101".into(),
            is_available: true,
        });
    }

    #[tokio::test]
    async fn test_payment_reminder_sends_and_renders_variables() {
        let fixture = fixture();
        let org = Uuid::new_v4();
        // Offset 3 on 2025-06-01 targets due dates on 2025-06-04.
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        let lease = lease(org, LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        seed_lease(&fixture, &lease);
        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentReminder, 3));

        let report = fixture.orchestrator.run_tick(now).await.expect("tick");
        assert_eq!(report.processed_organizations, 1);
        assert_eq!(report.total_sent(), 1);
        assert_eq!(report.total_failed(), 0);

        let logs = fixture.notifications.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, NotificationLogStatus::Sent);
        assert_eq!(
            logs[0].body,
            "Unit A-101: due 2025-06-04, rent 120000"
        );
        assert_eq!(logs[0].related_entity_id, Some(lease.id));
    }

    #[tokio::test]
    async fn test_offset_trigger_not_repeated_same_day() {
        let fixture = fixture();
        let org = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        let lease = lease(org, LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        seed_lease(&fixture, &lease);
        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentReminder, 3));

        fixture.orchestrator.run_tick(now).await.expect("first tick");
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap();
        let report = fixture.orchestrator.run_tick(later).await.expect("second tick");

        assert_eq!(report.total_sent(), 0);
        assert_eq!(fixture.notifications.logs().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_late_refires_every_tick() {
        let fixture = fixture();
        let org = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();

        // Draft, unpaid, due date already past.
        let lease = lease(org, LeaseStatus::Draft, date(2025, 6, 1), date(2026, 5, 31));
        seed_lease(&fixture, &lease);
        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentLate, 0));

        fixture.orchestrator.run_tick(now).await.expect("first tick");
        let later = Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap();
        fixture.orchestrator.run_tick(later).await.expect("second tick");

        // Two ticks, two log rows for the same lease. Duplicates are the
        // documented behavior for late payments.
        assert_eq!(fixture.notifications.logs().len(), 2);
    }

    #[tokio::test]
    async fn test_two_rules_same_trigger_send_once_per_lease() {
        let fixture = fixture();
        let org = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        let lease = lease(org, LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        seed_lease(&fixture, &lease);
        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentReminder, 3));
        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentReminder, 3));

        let report = fixture.orchestrator.run_tick(now).await.expect("tick");
        assert_eq!(report.total_sent(), 1);
        assert_eq!(fixture.notifications.logs().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_contact_isolated_from_other_leases() {
        let fixture = fixture();
        let org = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

        let good = lease(org, LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        seed_lease(&fixture, &good);
        // No contact row for this one.
        let orphan = lease(org, LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        fixture.leases.insert(orphan.clone());

        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentReminder, 3));

        let report = fixture.orchestrator.run_tick(now).await.expect("tick");
        assert_eq!(report.total_sent(), 1);
        assert_eq!(report.total_failed(), 1);
        let result = &report.results[0];
        assert_eq!(result.processed, 2);
        assert!(result.errors[0].contains(&orphan.id.to_string()));
    }

    #[tokio::test]
    async fn test_event_window_boundaries_are_exact_days() {
        let fixture = fixture();
        let org = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 0).unwrap();

        // Due one day past the offset-3 window: must not match.
        let outside = lease(org, LeaseStatus::Active, date(2025, 6, 5), date(2026, 6, 4));
        seed_lease(&fixture, &outside);
        fixture
            .notifications
            .insert_rule(rule(org, NotificationTrigger::PaymentReminder, 3));

        let report = fixture.orchestrator.run_tick(now).await.expect("tick");
        assert_eq!(report.total_sent(), 0);
        assert!(fixture.notifications.logs().is_empty());
    }
}
