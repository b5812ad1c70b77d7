//! Response DTOs for booking API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::availability::{BookingStatus, ExistingReservation};
use super::calculators::PriceBreakdown;
use super::models::Reservation;

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Response for a stay price calculation
#[derive(Debug, Serialize)]
pub struct PriceBreakdownResponse {
    pub nights: i64,
    pub nightly_rate: MoneyResponse,
    pub effective_nightly_rate: MoneyResponse,
    pub base_amount: MoneyResponse,
    pub subtotal: MoneyResponse,
    pub discount_amount: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percent: Decimal,
    pub discount_tier: String,
    pub cleaning_fee: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee_rate: Decimal,
    pub service_fee: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
    pub tax: MoneyResponse,
    pub total: MoneyResponse,
}

impl PriceBreakdownResponse {
    pub fn from_breakdown(b: &PriceBreakdown, currency: &str) -> Self {
        Self {
            nights: b.nights,
            nightly_rate: MoneyResponse::new(b.nightly_rate, currency),
            effective_nightly_rate: MoneyResponse::new(b.effective_nightly_rate, currency),
            base_amount: MoneyResponse::new(b.base_amount, currency),
            subtotal: MoneyResponse::new(b.subtotal, currency),
            discount_amount: MoneyResponse::new(b.discount_amount, currency),
            discount_percent: b.discount_percent,
            discount_tier: b.discount_tier.as_str().to_string(),
            cleaning_fee: MoneyResponse::new(b.cleaning_fee, currency),
            service_fee_rate: b.service_fee_rate,
            service_fee: MoneyResponse::new(b.service_fee, currency),
            tax_rate: b.tax_rate,
            tax: MoneyResponse::new(b.tax, currency),
            total: MoneyResponse::new(b.total, currency),
        }
    }
}

/// A reservation that blocks the requested dates
#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub status: BookingStatus,
}

impl From<&ExistingReservation> for ConflictResponse {
    fn from(r: &ExistingReservation) -> Self {
        Self {
            check_in: r.range.start,
            check_out: r.range.end,
            status: r.status,
        }
    }
}

/// Response for an availability check
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub conflicts: Vec<ConflictResponse>,
}

/// Response for a property quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub property_id: Uuid,
    pub property_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub available: bool,
    pub min_nights: i32,
    pub meets_minimum_stay: bool,
    pub guests_allowed: bool,
    pub price: PriceBreakdownResponse,
}

/// Response for a stored reservation
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_name: String,
    pub guests_count: i32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub nights: i32,
    pub status: String,
    pub subtotal: MoneyResponse,
    pub discount_amount: MoneyResponse,
    pub cleaning_fee: MoneyResponse,
    pub service_fee: MoneyResponse,
    pub tax: MoneyResponse,
    pub total: MoneyResponse,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        let currency = r.currency.as_str();
        Self {
            subtotal: MoneyResponse::new(r.subtotal, currency),
            discount_amount: MoneyResponse::new(r.discount_amount, currency),
            cleaning_fee: MoneyResponse::new(r.cleaning_fee, currency),
            service_fee: MoneyResponse::new(r.service_fee, currency),
            tax: MoneyResponse::new(r.tax, currency),
            total: MoneyResponse::new(r.total, currency),
            id: r.id,
            property_id: r.property_id,
            guest_name: r.guest_name,
            guests_count: r.guests_count,
            check_in: r.check_in,
            check_out: r.check_out,
            nights: r.nights,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
