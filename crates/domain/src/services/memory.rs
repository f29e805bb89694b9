//! In-memory store implementations for development and testing.
//!
//! Each store counts its query round-trips so tests can assert that batch
//! paths stay O(1) in the number of rows, and the lease store can simulate
//! transaction failures for specific leases to exercise failure isolation.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Lease, LeaseStatus, NewActivity, NewLease, NewNotificationLog, NotificationLog,
    NotificationLogStatus, NotificationRule, NotificationTrigger, TenantContact, TenantRef,
    UnitRef,
};
use crate::services::rules::{self, DayWindow};
use crate::services::store::{DirectoryStore, LeaseStore, NotificationStore, StoreError};

fn lease_from_new(new: NewLease) -> Lease {
    let now = Utc::now();
    Lease {
        id: Uuid::new_v4(),
        organization_id: new.organization_id,
        tenant_id: new.tenant_id,
        unit_id: new.unit_id,
        start_date: new.start_date,
        end_date: new.end_date,
        payment_cycle: new.payment_cycle,
        rent_amount: new.rent_amount,
        deposit_amount: new.deposit_amount,
        grace_period_days: new.grace_period_days,
        is_auto_renew: new.is_auto_renew,
        auto_renewal_notice_days: new.auto_renewal_notice_days,
        status: new.status,
        renewed_from_id: new.renewed_from_id,
        renewed_to_id: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory lease store.
#[derive(Default)]
pub struct MemoryLeaseStore {
    leases: Mutex<Vec<Lease>>,
    fail_renewals_for: Mutex<HashSet<Uuid>>,
    queries: AtomicUsize,
}

impl MemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing lease.
    pub fn insert(&self, lease: Lease) {
        self.leases.lock().expect("lease lock").push(lease);
    }

    /// Make `create_renewal` fail with a transaction error for this lease.
    pub fn fail_renewal_for(&self, lease_id: Uuid) {
        self.fail_renewals_for
            .lock()
            .expect("fail set lock")
            .insert(lease_id);
    }

    /// Number of store round-trips made so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Snapshot of all leases, for assertions.
    pub fn all(&self) -> Vec<Lease> {
        self.leases.lock().expect("lease lock").clone()
    }

    /// One lease by id, for assertions.
    pub fn get(&self, id: Uuid) -> Option<Lease> {
        self.leases
            .lock()
            .expect("lease lock")
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    fn bump(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn find_blocking_for_units(&self, unit_ids: &[Uuid]) -> Result<Vec<Lease>, StoreError> {
        self.bump();
        let wanted: HashSet<&Uuid> = unit_ids.iter().collect();
        Ok(self
            .leases
            .lock()
            .expect("lease lock")
            .iter()
            .filter(|l| wanted.contains(&l.unit_id) && l.status.occupies_unit())
            .cloned()
            .collect())
    }

    async fn create(&self, lease: NewLease) -> Result<Lease, StoreError> {
        self.bump();
        let created = lease_from_new(lease);
        self.leases.lock().expect("lease lock").push(created.clone());
        Ok(created)
    }

    async fn find_renewal_candidates(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<Lease>, StoreError> {
        self.bump();
        Ok(self
            .leases
            .lock()
            .expect("lease lock")
            .iter()
            .filter(|l| {
                l.status == LeaseStatus::Active
                    && l.is_auto_renew
                    && l.auto_renewal_notice_days.is_some()
                    && l.renewed_to_id.is_none()
                    && organization_id.is_none_or(|org| l.organization_id == org)
            })
            .cloned()
            .collect())
    }

    async fn create_renewal(
        &self,
        original_id: Uuid,
        successor: NewLease,
    ) -> Result<Lease, StoreError> {
        self.bump();
        if self
            .fail_renewals_for
            .lock()
            .expect("fail set lock")
            .contains(&original_id)
        {
            return Err(StoreError::Transaction(format!(
                "simulated write failure for lease {}",
                original_id
            )));
        }

        // Single lock scope keeps both writes atomic.
        let mut leases = self.leases.lock().expect("lease lock");
        let original = leases
            .iter_mut()
            .find(|l| l.id == original_id)
            .ok_or_else(|| StoreError::NotFound(format!("lease {}", original_id)))?;
        if original.status != LeaseStatus::Active {
            return Err(StoreError::Conflict(format!(
                "lease {} is {}, not active",
                original_id, original.status
            )));
        }
        if original.renewed_to_id.is_some() {
            return Err(StoreError::Conflict(format!(
                "lease {} already has a renewal",
                original_id
            )));
        }

        let created = lease_from_new(successor);
        original.status = LeaseStatus::Ended;
        original.renewed_to_id = Some(created.id);
        original.updated_at = Utc::now();
        leases.push(created.clone());
        Ok(created)
    }

    async fn find_payment_reminder_matches(
        &self,
        organization_id: Uuid,
        window: DayWindow,
    ) -> Result<Vec<Lease>, StoreError> {
        self.bump();
        Ok(self
            .leases
            .lock()
            .expect("lease lock")
            .iter()
            .filter(|l| {
                l.organization_id == organization_id
                    && rules::matches_payment_reminder(l, window)
            })
            .cloned()
            .collect())
    }

    async fn find_lease_expiring_matches(
        &self,
        organization_id: Uuid,
        window: DayWindow,
    ) -> Result<Vec<Lease>, StoreError> {
        self.bump();
        Ok(self
            .leases
            .lock()
            .expect("lease lock")
            .iter()
            .filter(|l| {
                l.organization_id == organization_id && rules::matches_lease_expiring(l, window)
            })
            .cloned()
            .collect())
    }

    async fn find_payment_late(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Lease>, StoreError> {
        self.bump();
        Ok(self
            .leases
            .lock()
            .expect("lease lock")
            .iter()
            .filter(|l| {
                l.organization_id == organization_id && rules::matches_payment_late(l, now)
            })
            .cloned()
            .collect())
    }
}

/// In-memory tenant/unit directory.
#[derive(Default)]
pub struct MemoryDirectoryStore {
    tenants: Mutex<Vec<TenantRef>>,
    units: Mutex<Vec<UnitRef>>,
    contacts: Mutex<HashMap<Uuid, TenantContact>>,
    activities: Mutex<Vec<NewActivity>>,
    activated: Mutex<Vec<Uuid>>,
    queries: AtomicUsize,
}

impl MemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tenant(&self, tenant: TenantRef) {
        self.tenants.lock().expect("tenant lock").push(tenant);
    }

    pub fn insert_unit(&self, unit: UnitRef) {
        self.units.lock().expect("unit lock").push(unit);
    }

    pub fn insert_contact(&self, contact: TenantContact) {
        self.contacts
            .lock()
            .expect("contact lock")
            .insert(contact.tenant_id, contact);
    }

    /// Number of store round-trips made so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Recorded activity rows, for assertions.
    pub fn activities(&self) -> Vec<NewActivity> {
        self.activities.lock().expect("activity lock").clone()
    }

    /// Tenants marked active, for assertions.
    pub fn activated_tenants(&self) -> Vec<Uuid> {
        self.activated.lock().expect("activated lock").clone()
    }

    fn bump(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn find_tenants_by_emails(
        &self,
        organization_id: Uuid,
        emails: &[String],
    ) -> Result<Vec<TenantRef>, StoreError> {
        self.bump();
        let wanted: HashSet<String> = emails.iter().map(|e| e.to_ascii_lowercase()).collect();
        Ok(self
            .tenants
            .lock()
            .expect("tenant lock")
            .iter()
            .filter(|t| {
                t.organization_id == organization_id
                    && wanted.contains(&t.email.to_ascii_lowercase())
            })
            .cloned()
            .collect())
    }

    async fn find_units_by_names(
        &self,
        _organization_id: Uuid,
        names: &[(String, String)],
    ) -> Result<Vec<UnitRef>, StoreError> {
        self.bump();
        let wanted: HashSet<&(String, String)> = names.iter().collect();
        Ok(self
            .units
            .lock()
            .expect("unit lock")
            .iter()
            .filter(|u| wanted.contains(&(u.property_name.clone(), u.name.clone())))
            .cloned()
            .collect())
    }

    async fn find_unit(&self, unit_id: Uuid) -> Result<Option<UnitRef>, StoreError> {
        self.bump();
        Ok(self
            .units
            .lock()
            .expect("unit lock")
            .iter()
            .find(|u| u.id == unit_id)
            .cloned())
    }

    async fn contact_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantContact>, StoreError> {
        self.bump();
        Ok(self
            .contacts
            .lock()
            .expect("contact lock")
            .get(&tenant_id)
            .cloned())
    }

    async fn mark_tenant_active(&self, tenant_id: Uuid) -> Result<(), StoreError> {
        self.bump();
        self.activated.lock().expect("activated lock").push(tenant_id);
        Ok(())
    }

    async fn record_activity(&self, activity: NewActivity) -> Result<(), StoreError> {
        self.bump();
        self.activities.lock().expect("activity lock").push(activity);
        Ok(())
    }
}

/// In-memory notification rules and dispatch log.
#[derive(Default)]
pub struct MemoryNotificationStore {
    rules: Mutex<Vec<NotificationRule>>,
    logs: Mutex<Vec<NotificationLog>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rule(&self, rule: NotificationRule) {
        self.rules.lock().expect("rule lock").push(rule);
    }

    /// Snapshot of the log, for assertions.
    pub fn logs(&self) -> Vec<NotificationLog> {
        self.logs.lock().expect("log lock").clone()
    }
}

#[async_trait::async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn organizations_with_active_rules(&self) -> Result<Vec<Uuid>, StoreError> {
        let mut orgs: Vec<Uuid> = Vec::new();
        for rule in self.rules.lock().expect("rule lock").iter() {
            if rule.is_active && !orgs.contains(&rule.organization_id) {
                orgs.push(rule.organization_id);
            }
        }
        Ok(orgs)
    }

    async fn active_rules(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
    ) -> Result<Vec<NotificationRule>, StoreError> {
        Ok(self
            .rules
            .lock()
            .expect("rule lock")
            .iter()
            .filter(|r| {
                r.is_active && r.organization_id == organization_id && r.trigger == trigger
            })
            .cloned()
            .collect())
    }

    async fn create_pending(
        &self,
        log: NewNotificationLog,
    ) -> Result<NotificationLog, StoreError> {
        let created = NotificationLog {
            id: Uuid::new_v4(),
            organization_id: log.organization_id,
            trigger: log.trigger,
            channel: log.channel,
            recipient: log.recipient,
            subject: log.subject,
            body: log.body,
            status: NotificationLogStatus::Pending,
            related_entity_id: log.related_entity_id,
            sent_at: None,
            failed_reason: None,
            created_at: Utc::now(),
        };
        self.logs.lock().expect("log lock").push(created.clone());
        Ok(created)
    }

    async fn mark_sent(&self, log_id: Uuid, sent_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut logs = self.logs.lock().expect("log lock");
        let log = logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| StoreError::NotFound(format!("notification log {}", log_id)))?;
        log.status = NotificationLogStatus::Sent;
        log.sent_at = Some(sent_at);
        Ok(())
    }

    async fn mark_failed(&self, log_id: Uuid, reason: &str) -> Result<(), StoreError> {
        let mut logs = self.logs.lock().expect("log lock");
        let log = logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| StoreError::NotFound(format!("notification log {}", log_id)))?;
        log.status = NotificationLogStatus::Failed;
        log.failed_reason = Some(reason.to_string());
        Ok(())
    }

    async fn was_notified_on(
        &self,
        organization_id: Uuid,
        trigger: NotificationTrigger,
        lease_id: Uuid,
        day: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self.logs.lock().expect("log lock").iter().any(|l| {
            l.organization_id == organization_id
                && l.trigger == trigger
                && l.related_entity_id == Some(lease_id)
                && l.status != NotificationLogStatus::Failed
                // Sent rows carry the caller's clock; pending rows only have
                // the insertion timestamp.
                && l.sent_at.unwrap_or(l.created_at).date_naive() == day
        }))
    }
}
