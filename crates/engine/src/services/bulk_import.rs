//! Bulk lease import coordinator.
//!
//! Rows come from a spreadsheet export. The pipeline validates each row
//! independently, resolves tenants and units in whole-set queries, checks
//! unit availability against one blocking-lease snapshot, and only then
//! writes. Store round-trips stay constant in the row count up to the write
//! step: one tenant query, one unit query, one lease fetch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use domain::models::{
    row_number, ImportReport, ImportSummary, InvalidRow, LeaseImportRow, LeaseStatus, NewActivity,
    NewLease, ParsedImportRow, TenantRef, UnitRef,
};
use domain::services::availability::{
    availability_key, batch_is_available, spans_conflict, AvailabilityRequest, CandidateSpan,
};
use domain::services::{DirectoryStore, LeaseStore};
use shared::validation::field_error;

use crate::error::EngineError;

/// A row that passed schema and cross-field validation.
struct Candidate {
    index: usize,
    row: LeaseImportRow,
    parsed: ParsedImportRow,
}

/// A candidate with its tenant and unit resolved.
struct Resolved {
    index: usize,
    row: LeaseImportRow,
    parsed: ParsedImportRow,
    tenant: TenantRef,
    unit: UnitRef,
}

/// Coordinates the import pipeline over the store seams.
pub struct BulkImportService {
    leases: Arc<dyn LeaseStore>,
    directory: Arc<dyn DirectoryStore>,
    max_rows: usize,
}

impl BulkImportService {
    pub fn new(
        leases: Arc<dyn LeaseStore>,
        directory: Arc<dyn DirectoryStore>,
        max_rows: usize,
    ) -> Self {
        Self {
            leases,
            directory,
            max_rows,
        }
    }

    /// Import (or dry-run) a batch of lease rows for one organization.
    pub async fn import_leases(
        &self,
        organization_id: Uuid,
        rows: Vec<LeaseImportRow>,
        dry_run: bool,
    ) -> Result<ImportReport, EngineError> {
        if rows.is_empty() {
            return Err(EngineError::Validation("no rows to import".into()));
        }
        if rows.len() > self.max_rows {
            return Err(EngineError::Validation(format!(
                "import exceeds the {} row limit",
                self.max_rows
            )));
        }

        let total = rows.len();
        let mut invalid_rows: Vec<InvalidRow> = Vec::new();

        // Steps 1-2: schema validation, then cross-field rules, each row on
        // its own. No store access yet.
        let mut candidates: Vec<Candidate> = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let errors = row.schema_errors();
            if !errors.is_empty() {
                invalid_rows.push(invalid(index, &row, errors));
                continue;
            }
            match row.parse() {
                Ok(parsed) => candidates.push(Candidate { index, row, parsed }),
                Err(errors) => invalid_rows.push(invalid(index, &row, errors)),
            }
        }

        // Step 3: whole-set tenant and unit resolution.
        let resolved = self
            .resolve_references(organization_id, candidates, &mut invalid_rows)
            .await?;

        // Step 4: one blocking-lease snapshot across every requested unit,
        // then in-memory availability.
        let accepted = self
            .check_availability(resolved, &mut invalid_rows)
            .await?;

        let mut report = ImportReport {
            summary: ImportSummary {
                total,
                valid: accepted.len(),
                invalid: invalid_rows.len(),
                created: 0,
            },
            invalid_rows,
            created_ids: Vec::new(),
            dry_run,
        };

        // Step 5: dry runs stop before any write.
        if dry_run {
            info!(
                organization_id = %organization_id,
                total = report.summary.total,
                valid = report.summary.valid,
                invalid = report.summary.invalid,
                "Bulk import dry run completed"
            );
            return Ok(report);
        }

        let mut activated: HashSet<Uuid> = HashSet::new();
        for item in accepted {
            let lease = self
                .leases
                .create(NewLease {
                    organization_id,
                    tenant_id: item.tenant.id,
                    unit_id: item.unit.id,
                    start_date: item.parsed.start_date,
                    end_date: item.parsed.end_date,
                    payment_cycle: item.parsed.payment_cycle,
                    rent_amount: item.row.rent_amount,
                    deposit_amount: item.row.deposit_amount,
                    grace_period_days: item.row.grace_period_days,
                    is_auto_renew: item.row.is_auto_renew,
                    auto_renewal_notice_days: item.row.auto_renewal_notice_days,
                    status: LeaseStatus::Draft,
                    renewed_from_id: None,
                })
                .await?;

            if activated.insert(item.tenant.id) {
                self.directory.mark_tenant_active(item.tenant.id).await?;
            }
            self.directory
                .record_activity(NewActivity::lease_imported(
                    organization_id,
                    lease.id,
                    row_number(item.index),
                ))
                .await?;
            report.created_ids.push(lease.id);
        }
        report.summary.created = report.created_ids.len();

        info!(
            organization_id = %organization_id,
            total = report.summary.total,
            created = report.summary.created,
            invalid = report.summary.invalid,
            "Bulk import completed"
        );
        Ok(report)
    }

    async fn resolve_references(
        &self,
        organization_id: Uuid,
        candidates: Vec<Candidate>,
        invalid_rows: &mut Vec<InvalidRow>,
    ) -> Result<Vec<Resolved>, EngineError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let emails: Vec<String> = dedup(
            candidates
                .iter()
                .map(|c| c.row.tenant_email.to_lowercase()),
        );
        let names: Vec<(String, String)> = dedup(
            candidates
                .iter()
                .map(|c| (c.row.property_name.clone(), c.row.unit_name.clone())),
        );

        let tenants: HashMap<String, TenantRef> = self
            .directory
            .find_tenants_by_emails(organization_id, &emails)
            .await?
            .into_iter()
            .map(|t| (t.email.to_lowercase(), t))
            .collect();
        let units: HashMap<(String, String), UnitRef> = self
            .directory
            .find_units_by_names(organization_id, &names)
            .await?
            .into_iter()
            .map(|u| ((u.property_name.clone(), u.name.clone()), u))
            .collect();

        let mut resolved = Vec::new();
        for candidate in candidates {
            let mut errors = Vec::new();

            let tenant = tenants.get(&candidate.row.tenant_email.to_lowercase());
            if tenant.is_none() {
                errors.push(field_error("TenantEmail", "no tenant with this email"));
            }

            let unit_key = (
                candidate.row.property_name.clone(),
                candidate.row.unit_name.clone(),
            );
            let unit = units.get(&unit_key);
            match unit {
                None => errors.push(field_error("UnitName", "no unit with this name")),
                Some(unit) if !unit.is_available => {
                    errors.push(field_error("UnitName", "unit is marked unavailable"));
                }
                Some(_) => {}
            }

            match (tenant, unit, errors.is_empty()) {
                (Some(tenant), Some(unit), true) => resolved.push(Resolved {
                    index: candidate.index,
                    tenant: tenant.clone(),
                    unit: unit.clone(),
                    row: candidate.row,
                    parsed: candidate.parsed,
                }),
                _ => invalid_rows.push(invalid(candidate.index, &candidate.row, errors)),
            }
        }
        Ok(resolved)
    }

    async fn check_availability(
        &self,
        resolved: Vec<Resolved>,
        invalid_rows: &mut Vec<InvalidRow>,
    ) -> Result<Vec<Resolved>, EngineError> {
        if resolved.is_empty() {
            return Ok(Vec::new());
        }

        let unit_ids: Vec<Uuid> = dedup(resolved.iter().map(|r| r.unit.id));
        let blocking = self.leases.find_blocking_for_units(&unit_ids).await?;

        let requests: Vec<AvailabilityRequest> = resolved
            .iter()
            .map(|r| AvailabilityRequest {
                unit_id: r.unit.id,
                start_date: r.parsed.start_date,
                end_date: r.parsed.end_date,
            })
            .collect();
        let availability = batch_is_available(&blocking, &requests);

        // Rows accepted earlier in the batch also claim their unit for the
        // requested dates, so later overlapping rows are rejected too.
        let mut claimed: HashMap<Uuid, Vec<CandidateSpan>> = HashMap::new();
        let mut accepted = Vec::new();

        for item in resolved {
            let key = availability_key(item.unit.id, item.parsed.start_date, item.parsed.end_date);
            if !availability.get(&key).copied().unwrap_or(false) {
                invalid_rows.push(invalid(
                    item.index,
                    &item.row,
                    vec![field_error(
                        "StartDate",
                        "unit is not available for these dates",
                    )],
                ));
                continue;
            }

            let span = CandidateSpan {
                start_date: item.parsed.start_date,
                end_date: item.parsed.end_date,
                is_auto_renew: item.row.is_auto_renew,
            };
            let conflicts_within_batch = claimed
                .get(&item.unit.id)
                .is_some_and(|spans| spans.iter().any(|prior| spans_conflict(*prior, span)));
            if conflicts_within_batch {
                invalid_rows.push(invalid(
                    item.index,
                    &item.row,
                    vec![field_error(
                        "StartDate",
                        "overlaps another row in this import",
                    )],
                ));
                continue;
            }

            claimed.entry(item.unit.id).or_default().push(span);
            accepted.push(item);
        }
        Ok(accepted)
    }
}

fn invalid(index: usize, row: &LeaseImportRow, errors: Vec<String>) -> InvalidRow {
    InvalidRow {
        row: row_number(index),
        tenant_email: row.tenant_email.clone(),
        errors,
    }
}

fn dedup<T: Clone + std::hash::Hash + Eq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
