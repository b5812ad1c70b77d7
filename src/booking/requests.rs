//! Request DTOs for booking API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

use super::availability::{DateRange, ExistingReservation};
use super::calculators::PriceInput;

/// Request to price a stay from explicit parameters
#[derive(Debug, Deserialize)]
pub struct CalculatePriceRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub nightly_rate: Decimal,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub weekly_discount_percent: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub monthly_discount_percent: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub cleaning_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub service_fee_rate: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl CalculatePriceRequest {
    /// Check the optional pricing knobs.
    ///
    /// Rate and range are left to the price engine.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_percent("weekly_discount_percent", self.weekly_discount_percent)?;
        validate_percent("monthly_discount_percent", self.monthly_discount_percent)?;
        validate_unit_rate("service_fee_rate", self.service_fee_rate)?;
        validate_unit_rate("tax_rate", self.tax_rate)?;
        if let Some(fee) = self.cleaning_fee {
            if fee < Decimal::ZERO {
                return Err(AppError::Validation(
                    "cleaning_fee must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Engine input, filling unset fee rates from the given defaults
    pub fn to_price_input(&self, default_service_fee_rate: Decimal, default_tax_rate: Decimal) -> PriceInput {
        PriceInput {
            nightly_rate: self.nightly_rate,
            range: DateRange::unchecked(self.start, self.end),
            weekly_discount_percent: self.weekly_discount_percent,
            monthly_discount_percent: self.monthly_discount_percent,
            cleaning_fee: self.cleaning_fee,
            service_fee_rate: Some(self.service_fee_rate.unwrap_or(default_service_fee_rate)),
            tax_rate: Some(self.tax_rate.unwrap_or(default_tax_rate)),
        }
    }
}

fn validate_percent(field: &str, value: Option<Decimal>) -> Result<(), AppError> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED => Err(AppError::Validation(
            format!("{} must be between 0 and 100", field),
        )),
        _ => Ok(()),
    }
}

fn validate_unit_rate(field: &str, value: Option<Decimal>) -> Result<(), AppError> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::ONE => Err(AppError::Validation(
            format!("{} must be between 0 and 1", field),
        )),
        _ => Ok(()),
    }
}

/// Request to check a candidate stay against a supplied reservation list
#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityRequest {
    pub candidate: DateRange,
    #[serde(default)]
    pub existing: Vec<ExistingReservation>,
}

/// Stay dates for a property quote or availability lookup
#[derive(Debug, Deserialize)]
pub struct StayDatesQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDatesQuery {
    pub fn range(&self) -> Result<DateRange, AppError> {
        Ok(DateRange::from_dates(self.check_in, self.check_out)?)
    }
}

/// Request to quote a stay at a property
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub guests_count: Option<i32>,
}

/// Request to create a booking
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    #[serde(default = "default_guests_count")]
    pub guests_count: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

fn default_guests_count() -> i32 {
    1
}

impl CreateBookingRequest {
    /// Check guest details (dates are checked by the workflow)
    pub fn validate(&self) -> Result<(), AppError> {
        if self.guest_name.trim().is_empty() {
            return Err(AppError::Validation("guest_name is required".to_string()));
        }
        let email = self.guest_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation(
                "guest_email must be a valid email address".to_string(),
            ));
        }
        if self.guests_count < 1 {
            return Err(AppError::Validation(
                "guests_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn calculate_request(json: serde_json::Value) -> CalculatePriceRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_calculate_request_parses_decimal_strings() {
        let req = calculate_request(serde_json::json!({
            "nightly_rate": "200",
            "start": "2025-01-01T00:00:00Z",
            "end": "2025-01-29T00:00:00Z",
            "monthly_discount_percent": "20",
            "cleaning_fee": "80"
        }));
        assert_eq!(req.nightly_rate, dec!(200));
        assert_eq!(req.monthly_discount_percent, Some(dec!(20)));
        assert_eq!(req.weekly_discount_percent, None);
        assert!(req.validate().is_ok());

        let input = req.to_price_input(dec!(0.12), dec!(0.13));
        assert_eq!(input.service_fee_rate, Some(dec!(0.12)));
        assert_eq!(input.tax_rate, Some(dec!(0.13)));
    }

    #[test]
    fn test_calculate_request_rejects_out_of_range_knobs() {
        let req = calculate_request(serde_json::json!({
            "nightly_rate": "100",
            "start": "2025-01-01T00:00:00Z",
            "end": "2025-01-02T00:00:00Z",
            "tax_rate": "1.3"
        }));
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        let req = calculate_request(serde_json::json!({
            "nightly_rate": "100",
            "start": "2025-01-01T00:00:00Z",
            "end": "2025-01-02T00:00:00Z",
            "weekly_discount_percent": "120"
        }));
        assert!(req.validate().is_err());

        let req = calculate_request(serde_json::json!({
            "nightly_rate": "100",
            "start": "2025-01-01T00:00:00Z",
            "end": "2025-01-02T00:00:00Z",
            "cleaning_fee": "-5"
        }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_booking_request_validation() {
        let mut req: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "property_id": "6f1c1a8e-4b7a-4d64-9b0e-0f5f2f3c9a11",
            "guest_name": "Ana Ruiz",
            "guest_email": "ana@example.com",
            "check_in": "2025-03-10",
            "check_out": "2025-03-15"
        }))
        .unwrap();
        assert_eq!(req.guests_count, 1);
        assert!(req.validate().is_ok());

        req.guest_email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        req.guest_email = "ana@example.com".to_string();
        req.guest_name = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_stay_dates_range() {
        let query = StayDatesQuery {
            check_in: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        };
        assert!(matches!(query.range(), Err(AppError::Pricing(_))));
    }
}
