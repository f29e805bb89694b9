//! Common validation utilities for lease payloads and import rows.

use chrono::NaiveDate;
use validator::ValidationError;

/// Date format accepted for lease start/end dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum grace period in days.
const MAX_GRACE_PERIOD_DAYS: i32 = 90;

/// Maximum auto-renewal notice period in days.
const MAX_NOTICE_DAYS: i32 = 365;

/// Validates that a monetary amount (minor units) is non-negative.
pub fn validate_amount(amount: i64) -> Result<(), ValidationError> {
    if amount >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("Amount must be non-negative".into());
        Err(err)
    }
}

/// Validates that a grace period is within range (0 to 90 days).
pub fn validate_grace_period(days: i32) -> Result<(), ValidationError> {
    if (0..=MAX_GRACE_PERIOD_DAYS).contains(&days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("grace_period_range");
        err.message = Some("Grace period must be between 0 and 90 days".into());
        Err(err)
    }
}

/// Validates that an auto-renewal notice period is within range (1 to 365 days).
pub fn validate_notice_days(days: i32) -> Result<(), ValidationError> {
    if (1..=MAX_NOTICE_DAYS).contains(&days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("notice_days_range");
        err.message = Some("Notice period must be between 1 and 365 days".into());
        Err(err)
    }
}

/// Validates that a string parses as an ISO calendar date (YYYY-MM-DD).
pub fn validate_date_string(value: &str) -> Result<(), ValidationError> {
    if parse_date(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_format");
        err.message = Some("Date must be in YYYY-MM-DD format".into());
        Err(err)
    }
}

/// Parses an ISO calendar date, returning `None` for malformed input.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Formats a row-level error as `"<Field>: <message>"` so callers can
/// re-display it against the original spreadsheet column.
pub fn field_error(field: &str, message: &str) -> String {
    format!("{}: {}", field, message)
}
