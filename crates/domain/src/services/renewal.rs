//! Auto-renewal date math and eligibility predicates.
//!
//! All predicates take `now` explicitly so runs are deterministic under a
//! fixed clock; only the outermost job reads the wall clock.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};

use crate::models::{Lease, LeaseStatus, NewLease, PaymentCycle};

/// Computes the successor period for a lease ending on `original_end`.
///
/// The successor starts the day after the original ends. The end is one cycle
/// unit later minus a day, with calendar rollover: adding a month to Jan 31
/// clamps to the last day of February rather than spilling into March. A
/// daily lease is exactly one day, so its period is just the start date.
pub fn renewal_period(original_end: NaiveDate, cycle: PaymentCycle) -> (NaiveDate, NaiveDate) {
    let start = original_end
        .checked_add_days(Days::new(1))
        .expect("lease end date is far from the calendar limit");
    let end = match cycle {
        PaymentCycle::Daily => start,
        PaymentCycle::Monthly => start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .expect("lease end date is far from the calendar limit"),
        PaymentCycle::Annual => start
            .checked_add_months(Months::new(12))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .expect("lease end date is far from the calendar limit"),
    };
    (start, end)
}

/// The date on which the renewal window opens (and the cancellation window
/// closes): `end_date - notice_days`. `None` when notice days are not set.
pub fn renewal_deadline(lease: &Lease) -> Option<NaiveDate> {
    let notice_days = lease.auto_renewal_notice_days?;
    lease.end_date.checked_sub_days(Days::new(notice_days.max(0) as u64))
}

/// Whether a lease must auto-renew as of `now`.
///
/// Pure predicate; re-evaluating it never mutates state. Requires auto-renew
/// with configured notice days, Active status, no successor yet, and `now` on
/// or past the renewal deadline.
pub fn should_auto_renew(lease: &Lease, now: DateTime<Utc>) -> bool {
    if !lease.is_auto_renew || lease.status != LeaseStatus::Active || lease.has_successor() {
        return false;
    }
    match renewal_deadline(lease) {
        Some(deadline) => now.date_naive() >= deadline,
        None => false,
    }
}

/// Whether the tenant can still cancel the pending auto-renewal as of `now`.
/// The window closes exactly at the renewal deadline.
pub fn can_cancel_auto_renewal(lease: &Lease, now: DateTime<Utc>) -> bool {
    match renewal_deadline(lease) {
        Some(deadline) => now.date_naive() < deadline,
        None => false,
    }
}

/// Builds the successor lease input for an eligible original.
///
/// The successor starts in Draft with the original's tenant, unit, cycle,
/// amounts, grace period, and auto-renewal settings, and back-references the
/// original via `renewed_from_id`.
pub fn successor_lease(original: &Lease) -> NewLease {
    let (start_date, end_date) = renewal_period(original.end_date, original.payment_cycle);
    NewLease {
        organization_id: original.organization_id,
        tenant_id: original.tenant_id,
        unit_id: original.unit_id,
        start_date,
        end_date,
        payment_cycle: original.payment_cycle,
        rent_amount: original.rent_amount,
        deposit_amount: original.deposit_amount,
        grace_period_days: original.grace_period_days,
        is_auto_renew: original.is_auto_renew,
        auto_renewal_notice_days: original.auto_renewal_notice_days,
        status: LeaseStatus::Draft,
        renewed_from_id: Some(original.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn auto_renew_lease(end: NaiveDate, notice_days: i32) -> Lease {
        Lease {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            unit_id: Uuid::nil(),
            start_date: date(2024, 1, 1),
            end_date: end,
            payment_cycle: PaymentCycle::Monthly,
            rent_amount: 150_000,
            deposit_amount: 300_000,
            grace_period_days: 7,
            is_auto_renew: true,
            auto_renewal_notice_days: Some(notice_days),
            status: LeaseStatus::Active,
            renewed_from_id: None,
            renewed_to_id: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_monthly_renewal_calendar_rollover() {
        // Jan 31 + 1 month clamps to end of February, not a flat 30-day add.
        let (start, end) = renewal_period(date(2024, 1, 31), PaymentCycle::Monthly);
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(end, date(2024, 2, 29)); // 2024 is a leap year

        let (start, end) = renewal_period(date(2023, 1, 31), PaymentCycle::Monthly);
        assert_eq!(start, date(2023, 2, 1));
        assert_eq!(end, date(2023, 2, 28));
    }

    #[test]
    fn test_monthly_renewal_plain_month() {
        let (start, end) = renewal_period(date(2025, 3, 31), PaymentCycle::Monthly);
        assert_eq!(start, date(2025, 4, 1));
        assert_eq!(end, date(2025, 4, 30));
    }

    #[test]
    fn test_annual_renewal_full_year() {
        let (start, end) = renewal_period(date(2024, 12, 31), PaymentCycle::Annual);
        assert_eq!(start, date(2025, 1, 1));
        assert_eq!(end, date(2025, 12, 31));
    }

    #[test]
    fn test_annual_renewal_over_leap_day() {
        let (start, end) = renewal_period(date(2024, 2, 28), PaymentCycle::Annual);
        assert_eq!(start, date(2024, 2, 29));
        assert_eq!(end, date(2025, 2, 28));
    }

    #[test]
    fn test_daily_renewal_is_one_day() {
        let (start, end) = renewal_period(date(2025, 5, 10), PaymentCycle::Daily);
        assert_eq!(start, date(2025, 5, 11));
        assert_eq!(end, date(2025, 5, 11));
    }

    #[test]
    fn test_should_auto_renew_at_deadline() {
        let lease = auto_renew_lease(date(2025, 6, 30), 30);
        // Deadline is May 31.
        assert!(!should_auto_renew(&lease, at(2025, 5, 30)));
        assert!(should_auto_renew(&lease, at(2025, 5, 31)));
        assert!(should_auto_renew(&lease, at(2025, 6, 15)));
    }

    #[test]
    fn test_should_auto_renew_guards() {
        let now = at(2025, 6, 15);

        let mut lease = auto_renew_lease(date(2025, 6, 30), 30);
        lease.is_auto_renew = false;
        assert!(!should_auto_renew(&lease, now));

        let mut lease = auto_renew_lease(date(2025, 6, 30), 30);
        lease.auto_renewal_notice_days = None;
        assert!(!should_auto_renew(&lease, now));

        let mut lease = auto_renew_lease(date(2025, 6, 30), 30);
        lease.status = LeaseStatus::Draft;
        assert!(!should_auto_renew(&lease, now));

        let mut lease = auto_renew_lease(date(2025, 6, 30), 30);
        lease.renewed_to_id = Some(Uuid::new_v4());
        assert!(!should_auto_renew(&lease, now));
    }

    #[test]
    fn test_should_auto_renew_is_pure() {
        let lease = auto_renew_lease(date(2025, 6, 30), 30);
        let now = at(2025, 6, 15);
        let first = should_auto_renew(&lease, now);
        let second = should_auto_renew(&lease, now);
        assert_eq!(first, second);
        assert!(lease.renewed_to_id.is_none());
        assert_eq!(lease.status, LeaseStatus::Active);
    }

    #[test]
    fn test_cancellation_window_closes_at_deadline() {
        let lease = auto_renew_lease(date(2025, 6, 30), 30);
        assert!(can_cancel_auto_renewal(&lease, at(2025, 5, 30)));
        assert!(!can_cancel_auto_renewal(&lease, at(2025, 5, 31)));
        assert!(!can_cancel_auto_renewal(&lease, at(2025, 6, 15)));
    }

    #[test]
    fn test_cancellation_requires_notice_days() {
        let mut lease = auto_renew_lease(date(2025, 6, 30), 30);
        lease.auto_renewal_notice_days = None;
        assert!(!can_cancel_auto_renewal(&lease, at(2025, 1, 1)));
    }

    #[test]
    fn test_successor_copies_terms_and_backlinks() {
        let original = auto_renew_lease(date(2025, 6, 30), 30);
        let successor = successor_lease(&original);
        assert_eq!(successor.start_date, date(2025, 7, 1));
        assert_eq!(successor.end_date, date(2025, 7, 31));
        assert_eq!(successor.tenant_id, original.tenant_id);
        assert_eq!(successor.unit_id, original.unit_id);
        assert_eq!(successor.rent_amount, original.rent_amount);
        assert_eq!(successor.deposit_amount, original.deposit_amount);
        assert_eq!(successor.grace_period_days, original.grace_period_days);
        assert!(successor.is_auto_renew);
        assert_eq!(successor.auto_renewal_notice_days, Some(30));
        assert_eq!(successor.status, LeaseStatus::Draft);
        assert_eq!(successor.renewed_from_id, Some(original.id));
    }
}
