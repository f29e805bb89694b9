//! Date-range availability checks for units.
//!
//! A unit is double-booked when two leases in Draft or Active status occupy
//! the same day. Auto-renewing leases have no fixed end, so ordinary interval
//! intersection is unsound for them: they are treated as a half-open ray from
//! their start date onward, and must be explicitly ended before any future
//! booking on the unit.

use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::Lease;

/// One candidate booking for the batch variant.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityRequest {
    pub unit_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Lookup key for a batch result: `"{unit_id}:{start}:{end}"`.
///
/// Composing the key from all three parts keeps two candidates on the same
/// unit (or the same dates on different units) from colliding.
pub fn availability_key(unit_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!("{}:{}:{}", unit_id, start_date, end_date)
}

/// Whether an existing lease blocks the candidate interval.
pub fn blocks(lease: &Lease, candidate_start: NaiveDate, candidate_end: NaiveDate) -> bool {
    if !lease.status.occupies_unit() {
        return false;
    }
    if lease.is_auto_renew {
        // Open-ended going forward: blocks everything from its start date on.
        lease.start_date <= candidate_end
    } else {
        // Closed-interval intersection on inclusive calendar dates.
        lease.start_date <= candidate_end && lease.end_date >= candidate_start
    }
}

/// A booking candidate that is not a lease yet, carrying its own open-ended
/// flag. Used for pairwise checks between rows of one import batch.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSpan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_auto_renew: bool,
}

/// Whether two candidate spans on the same unit conflict.
///
/// Symmetric counterpart of [`blocks`]: an auto-renewing span is an open ray
/// from its start date in either position, so a later auto-renewing span
/// conflicts with an earlier fixed one just as the reverse does.
pub fn spans_conflict(a: CandidateSpan, b: CandidateSpan) -> bool {
    if a.is_auto_renew && a.start_date <= b.end_date {
        return true;
    }
    if b.is_auto_renew && b.start_date <= a.end_date {
        return true;
    }
    a.start_date <= b.end_date && a.end_date >= b.start_date
}

/// Whether the candidate interval is free among the given leases for one unit.
///
/// `leases` is the Draft/Active snapshot for the candidate's unit;
/// `exclude_lease_id` skips one lease, for edit flows.
pub fn is_available(
    leases: &[Lease],
    candidate_start: NaiveDate,
    candidate_end: NaiveDate,
    exclude_lease_id: Option<Uuid>,
) -> bool {
    leases
        .iter()
        .filter(|lease| Some(lease.id) != exclude_lease_id)
        .all(|lease| !blocks(lease, candidate_start, candidate_end))
}

/// Resolves many candidates against one bulk lease snapshot.
///
/// `leases` is a single fetch across the union of all requested unit ids;
/// grouping happens in memory so the caller never issues one query per row.
pub fn batch_is_available(
    leases: &[Lease],
    requests: &[AvailabilityRequest],
) -> HashMap<String, bool> {
    let mut by_unit: HashMap<Uuid, Vec<&Lease>> = HashMap::new();
    for lease in leases {
        by_unit.entry(lease.unit_id).or_default().push(lease);
    }

    let mut results = HashMap::with_capacity(requests.len());
    for request in requests {
        let free = by_unit
            .get(&request.unit_id)
            .map(|unit_leases| {
                unit_leases
                    .iter()
                    .all(|lease| !blocks(lease, request.start_date, request.end_date))
            })
            .unwrap_or(true);
        results.insert(
            availability_key(request.unit_id, request.start_date, request.end_date),
            free,
        );
    }
    results
}
