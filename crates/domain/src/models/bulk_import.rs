//! Bulk lease import models.
//!
//! Rows arrive from a spreadsheet export and reference tenants and units by
//! external identifiers. Row-level errors use a stable `"<Field>: <message>"`
//! format, and the reported row number is `array index + 2` (1-indexed source
//! with a header row) so callers can point back at the original sheet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation;

use super::lease::PaymentCycle;

/// Maximum rows per bulk import request.
pub const MAX_IMPORT_ROWS: usize = 1000;

/// First data row number in the source spreadsheet (row 1 is the header).
const FIRST_DATA_ROW: usize = 2;

/// Single lease row in a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeaseImportRow {
    /// Tenant resolved by email within the organization.
    #[validate(email(message = "must be a valid email address"))]
    pub tenant_email: String,

    /// Property resolved by name within the organization.
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub property_name: String,

    /// Unit resolved by name within the property.
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub unit_name: String,

    /// Inclusive start date, YYYY-MM-DD.
    pub start_date: String,

    /// Inclusive end date, YYYY-MM-DD.
    pub end_date: String,

    /// daily | monthly | annual.
    pub payment_cycle: String,

    /// Rent per cycle in minor units.
    pub rent_amount: i64,

    /// Deposit in minor units.
    #[serde(default)]
    pub deposit_amount: i64,

    #[serde(default)]
    pub grace_period_days: i32,

    #[serde(default)]
    pub is_auto_renew: bool,

    /// Required (>= 1) when `is_auto_renew` is set.
    pub auto_renewal_notice_days: Option<i32>,
}

impl LeaseImportRow {
    /// Per-field schema validation, independent of every other row.
    ///
    /// Returns `"<Field>: <message>"` strings; cross-field rules (date order,
    /// auto-renew notice requirement) belong to [`LeaseImportRow::parse`].
    pub fn schema_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(field_errors) = self.validate() {
            for (field, errs) in field_errors.field_errors() {
                let label = field_label(field);
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "is invalid".to_string());
                    errors.push(validation::field_error(label, &message));
                }
            }
        }

        if let Err(err) = validation::validate_date_string(&self.start_date) {
            errors.push(validation::field_error(
                "StartDate",
                &err.message.unwrap_or_default(),
            ));
        }
        if let Err(err) = validation::validate_date_string(&self.end_date) {
            errors.push(validation::field_error(
                "EndDate",
                &err.message.unwrap_or_default(),
            ));
        }
        if PaymentCycle::parse(&self.payment_cycle).is_none() {
            errors.push(validation::field_error(
                "PaymentCycle",
                "must be one of daily, monthly, annual",
            ));
        }
        if let Err(err) = validation::validate_amount(self.rent_amount) {
            errors.push(validation::field_error(
                "RentAmount",
                &err.message.unwrap_or_default(),
            ));
        }
        if let Err(err) = validation::validate_amount(self.deposit_amount) {
            errors.push(validation::field_error(
                "DepositAmount",
                &err.message.unwrap_or_default(),
            ));
        }
        if let Err(err) = validation::validate_grace_period(self.grace_period_days) {
            errors.push(validation::field_error(
                "GracePeriodDays",
                &err.message.unwrap_or_default(),
            ));
        }
        if let Some(notice_days) = self.auto_renewal_notice_days {
            if let Err(err) = validation::validate_notice_days(notice_days) {
                errors.push(validation::field_error(
                    "AutoRenewalNoticeDays",
                    &err.message.unwrap_or_default(),
                ));
            }
        }

        errors
    }

    /// Cross-field parsing and business rules for a schema-valid row.
    pub fn parse(&self) -> Result<ParsedImportRow, Vec<String>> {
        let mut errors = Vec::new();

        let start_date = validation::parse_date(&self.start_date);
        let end_date = validation::parse_date(&self.end_date);
        let payment_cycle = PaymentCycle::parse(&self.payment_cycle);

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start >= end {
                errors.push(validation::field_error(
                    "EndDate",
                    "must be after the start date",
                ));
            }
        }
        if self.is_auto_renew && self.auto_renewal_notice_days.is_none() {
            errors.push(validation::field_error(
                "AutoRenewalNoticeDays",
                "is required when auto-renew is enabled",
            ));
        }

        match (start_date, end_date, payment_cycle, errors.is_empty()) {
            (Some(start_date), Some(end_date), Some(payment_cycle), true) => Ok(ParsedImportRow {
                start_date,
                end_date,
                payment_cycle,
            }),
            _ => Err(errors),
        }
    }
}

/// Maps a struct field name to its spreadsheet column label.
fn field_label(field: &str) -> &'static str {
    match field {
        "tenant_email" => "TenantEmail",
        "property_name" => "PropertyName",
        "unit_name" => "UnitName",
        "start_date" => "StartDate",
        "end_date" => "EndDate",
        "payment_cycle" => "PaymentCycle",
        "rent_amount" => "RentAmount",
        "deposit_amount" => "DepositAmount",
        "grace_period_days" => "GracePeriodDays",
        "is_auto_renew" => "IsAutoRenew",
        "auto_renewal_notice_days" => "AutoRenewalNoticeDays",
        _ => "Row",
    }
}

/// Typed fields extracted from a row once cross-field validation passes.
#[derive(Debug, Clone, Copy)]
pub struct ParsedImportRow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_cycle: PaymentCycle,
}

/// Spreadsheet row number for a zero-based array index.
pub fn row_number(index: usize) -> usize {
    index + FIRST_DATA_ROW
}

/// A rejected row with its spreadsheet position and error list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRow {
    pub row: usize,
    pub tenant_email: String,
    pub errors: Vec<String>,
}

/// Aggregate counts for an import run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub created: usize,
}

/// Result of a bulk import (or a dry run).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub invalid_rows: Vec<InvalidRow>,
    pub created_ids: Vec<Uuid>,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> LeaseImportRow {
        LeaseImportRow {
            tenant_email: "ada@example.com".into(),
            property_name: "Riverside".into(),
            unit_name: "A-101".into(),
            start_date: "2025-07-01".into(),
            end_date: "2026-06-30".into(),
            payment_cycle: "monthly".into(),
            rent_amount: 120_000,
            deposit_amount: 240_000,
            grace_period_days: 5,
            is_auto_renew: false,
            auto_renewal_notice_days: None,
        }
    }

    #[test]
    fn test_valid_row_has_no_schema_errors() {
        assert!(sample_row().schema_errors().is_empty());
    }

    #[test]
    fn test_schema_errors_use_field_labels() {
        let row = LeaseImportRow {
            tenant_email: "not-an-email".into(),
            start_date: "01/07/2025".into(),
            rent_amount: -5,
            ..sample_row()
        };
        let errors = row.schema_errors();
        assert!(errors
            .iter()
            .any(|e| e == "TenantEmail: must be a valid email address"));
        assert!(errors
            .iter()
            .any(|e| e == "StartDate: Date must be in YYYY-MM-DD format"));
        assert!(errors
            .iter()
            .any(|e| e == "RentAmount: Amount must be non-negative"));
    }

    #[test]
    fn test_parse_rejects_inverted_dates() {
        let row = LeaseImportRow {
            start_date: "2026-06-30".into(),
            end_date: "2025-07-01".into(),
            ..sample_row()
        };
        let errors = row.parse().unwrap_err();
        assert_eq!(errors, vec!["EndDate: must be after the start date"]);
    }

    #[test]
    fn test_parse_rejects_equal_dates() {
        let row = LeaseImportRow {
            start_date: "2025-07-01".into(),
            end_date: "2025-07-01".into(),
            ..sample_row()
        };
        assert!(row.parse().is_err());
    }

    #[test]
    fn test_parse_requires_notice_days_for_auto_renew() {
        let row = LeaseImportRow {
            is_auto_renew: true,
            auto_renewal_notice_days: None,
            ..sample_row()
        };
        let errors = row.parse().unwrap_err();
        assert_eq!(
            errors,
            vec!["AutoRenewalNoticeDays: is required when auto-renew is enabled"]
        );
    }

    #[test]
    fn test_parse_extracts_typed_fields() {
        let parsed = sample_row().parse().unwrap();
        assert_eq!(
            parsed.start_date,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert_eq!(
            parsed.end_date,
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
        );
        assert_eq!(parsed.payment_cycle, PaymentCycle::Monthly);
    }

    #[test]
    fn test_row_number_accounts_for_header() {
        assert_eq!(row_number(0), 2);
        assert_eq!(row_number(41), 43);
    }
}
