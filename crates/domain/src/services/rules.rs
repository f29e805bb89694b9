//! Notification rule target-date math and lease matching predicates.
//!
//! Offset-based triggers match an exact calendar day: the rule's target date
//! is `today + days_offset` normalized to midnight, and a lease matches when
//! its relevant date falls in `[target, target + 1 day)`. PaymentLate has no
//! offset semantics and matches any overdue draft lease on every tick.
//!
//! The SQL queries in the persistence layer mirror these predicates; the
//! in-memory store evaluates them directly.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::models::{Lease, LeaseStatus};

/// Half-open UTC day window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Whether an instant falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether a calendar date's midnight falls inside the window.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc())
    }
}

/// The exact-day match window for an offset rule evaluated on `today`.
pub fn target_window(today: NaiveDate, days_offset: i32) -> DayWindow {
    let target = if days_offset >= 0 {
        today.checked_add_days(Days::new(days_offset as u64))
    } else {
        today.checked_sub_days(Days::new(days_offset.unsigned_abs() as u64))
    }
    .expect("rule offset stays within the calendar range");

    let start = target.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    let end = start + chrono::Duration::days(1);
    DayWindow { start, end }
}

/// PaymentReminder: Active, unpaid, due (start) date on the target day.
pub fn matches_payment_reminder(lease: &Lease, window: DayWindow) -> bool {
    lease.status == LeaseStatus::Active
        && lease.paid_at.is_none()
        && window.contains_date(lease.start_date)
}

/// LeaseExpiring: Active, end date on the target day.
pub fn matches_lease_expiring(lease: &Lease, window: DayWindow) -> bool {
    lease.status == LeaseStatus::Active && window.contains_date(lease.end_date)
}

/// PaymentLate: Draft, unpaid, due date already passed as of `now`.
/// Re-evaluated every tick; deduplication is the orchestrator's concern.
pub fn matches_payment_late(lease: &Lease, now: DateTime<Utc>) -> bool {
    lease.status == LeaseStatus::Draft
        && lease.paid_at.is_none()
        && lease.start_date < now.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentCycle;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lease(status: LeaseStatus, start: NaiveDate, end: NaiveDate) -> Lease {
        Lease {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            unit_id: Uuid::nil(),
            start_date: start,
            end_date: end,
            payment_cycle: PaymentCycle::Monthly,
            rent_amount: 100_000,
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

    #[test]
    fn test_target_window_positive_offset() {
        // Offset 3 on 2025-06-01 matches exactly [2025-06-04, 2025-06-05).
        let window = target_window(date(2025, 6, 1), 3);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap()
        );
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2025, 6, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_target_window_boundary_is_half_open() {
        let window = target_window(date(2025, 6, 1), 3);
        // 23:59 on the target day is in; midnight of the next day is out.
        assert!(window.contains(Utc.with_ymd_and_hms(2025, 6, 4, 23, 59, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 6, 5, 0, 0, 0).unwrap()));
        assert!(window.contains(Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_target_window_negative_offset() {
        let window = target_window(date(2025, 6, 10), -3);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2025, 6, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_target_window_zero_offset() {
        let window = target_window(date(2025, 6, 1), 0);
        assert!(window.contains_date(date(2025, 6, 1)));
        assert!(!window.contains_date(date(2025, 6, 2)));
    }

    #[test]
    fn test_payment_reminder_exact_day_match() {
        let window = target_window(date(2025, 6, 1), 3);
        let due = lease(LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        let not_yet = lease(LeaseStatus::Active, date(2025, 6, 5), date(2026, 6, 4));
        assert!(matches_payment_reminder(&due, window));
        assert!(!matches_payment_reminder(&not_yet, window));
    }

    #[test]
    fn test_payment_reminder_requires_active_unpaid() {
        let window = target_window(date(2025, 6, 1), 3);
        let mut matched = lease(LeaseStatus::Active, date(2025, 6, 4), date(2026, 6, 3));
        matched.paid_at = Some(Utc::now());
        assert!(!matches_payment_reminder(&matched, window));

        let draft = lease(LeaseStatus::Draft, date(2025, 6, 4), date(2026, 6, 3));
        assert!(!matches_payment_reminder(&draft, window));
    }

    #[test]
    fn test_lease_expiring_matches_end_date() {
        let window = target_window(date(2025, 6, 1), 14);
        let expiring = lease(LeaseStatus::Active, date(2024, 6, 15), date(2025, 6, 15));
        let later = lease(LeaseStatus::Active, date(2024, 6, 16), date(2025, 6, 16));
        assert!(matches_lease_expiring(&expiring, window));
        assert!(!matches_lease_expiring(&later, window));
    }

    #[test]
    fn test_payment_late_matches_overdue_drafts() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();
        let overdue = lease(LeaseStatus::Draft, date(2025, 6, 9), date(2026, 6, 8));
        let due_today = lease(LeaseStatus::Draft, date(2025, 6, 10), date(2026, 6, 9));
        let active = lease(LeaseStatus::Active, date(2025, 6, 9), date(2026, 6, 8));
        assert!(matches_payment_late(&overdue, now));
        assert!(!matches_payment_late(&due_today, now));
        assert!(!matches_payment_late(&active, now));

        let mut paid = overdue.clone();
        paid.paid_at = Some(now);
        assert!(!matches_payment_late(&paid, now));
    }
}
