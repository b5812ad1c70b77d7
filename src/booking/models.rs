//! Database models for booking queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::availability::{BookingStatus, DateRange, ExistingReservation};
use super::calculators::PriceInput;

/// Rental property from properties
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub currency: String,
    pub nightly_rate: Decimal,
    pub weekly_discount_percent: Option<Decimal>,
    pub monthly_discount_percent: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub service_fee_rate: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub min_nights: i32,
    pub max_guests: i32,
    pub active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Whether the property can currently take bookings
    pub fn is_bookable(&self) -> bool {
        self.active && self.deleted_at.is_none()
    }

    /// Price input for a stay at this property.
    ///
    /// Fee rates the property leaves unset fall back to the given defaults.
    pub fn price_input(
        &self,
        range: DateRange,
        default_service_fee_rate: Decimal,
        default_tax_rate: Decimal,
    ) -> PriceInput {
        PriceInput {
            nightly_rate: self.nightly_rate,
            range,
            weekly_discount_percent: self.weekly_discount_percent,
            monthly_discount_percent: self.monthly_discount_percent,
            cleaning_fee: self.cleaning_fee,
            service_fee_rate: Some(self.service_fee_rate.unwrap_or(default_service_fee_rate)),
            tax_rate: Some(self.tax_rate.unwrap_or(default_tax_rate)),
        }
    }
}

/// Reservation from reservations
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guests_count: i32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub nights: i32,
    pub status: String,
    pub currency: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub cleaning_fee: Decimal,
    pub service_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Parsed status; unknown strings are treated as blocking so a bad row
    /// never frees up the calendar.
    pub fn booking_status(&self) -> BookingStatus {
        self.status.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Reservation {} has unknown status '{}', treating as pending",
                self.id,
                self.status
            );
            BookingStatus::Pending
        })
    }

    pub fn range(&self) -> DateRange {
        DateRange::unchecked(self.check_in, self.check_out)
    }

    /// Calendar view of this row for the availability checker
    pub fn as_existing(&self) -> ExistingReservation {
        ExistingReservation::new(self.range(), self.booking_status())
    }
}

/// Values for a reservation insert
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub property_id: Uuid,
    pub guest_name: String,
    pub guest_email: String,
    pub guests_count: i32,
    pub range: DateRange,
    pub nights: i32,
    pub status: BookingStatus,
    pub currency: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub cleaning_fee: Decimal,
    pub service_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn property() -> Property {
        Property {
            id: Uuid::new_v4(),
            slug: "lakeside-cabin".to_string(),
            name: "Lakeside Cabin".to_string(),
            currency: "USD".to_string(),
            nightly_rate: dec!(200),
            weekly_discount_percent: Some(dec!(10)),
            monthly_discount_percent: Some(dec!(20)),
            cleaning_fee: Some(dec!(80)),
            service_fee_rate: None,
            tax_rate: Some(dec!(0.08)),
            min_nights: 2,
            max_guests: 4,
            active: true,
            deleted_at: None,
        }
    }

    fn reservation(status: &str) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            guest_name: "Ana".to_string(),
            guest_email: "ana@example.com".to_string(),
            guests_count: 2,
            check_in: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap(),
            nights: 3,
            status: status.to_string(),
            currency: "USD".to_string(),
            subtotal: dec!(600),
            discount_amount: dec!(0),
            cleaning_fee: dec!(80),
            service_fee: dec!(72),
            tax: dec!(60),
            total: dec!(812),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_property_price_input_falls_back_to_defaults() {
        let p = property();
        let range = DateRange::unchecked(
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap(),
        );
        let input = p.price_input(range, dec!(0.12), dec!(0.13));
        assert_eq!(input.service_fee_rate, Some(dec!(0.12)));
        assert_eq!(input.tax_rate, Some(dec!(0.08)));
        assert_eq!(input.cleaning_fee, Some(dec!(80)));
    }

    #[test]
    fn test_property_is_bookable() {
        let mut p = property();
        assert!(p.is_bookable());
        p.deleted_at = Some(Utc::now());
        assert!(!p.is_bookable());
    }

    #[test]
    fn test_reservation_as_existing() {
        let r = reservation("cancelled");
        let existing = r.as_existing();
        assert_eq!(existing.status, BookingStatus::Cancelled);
        assert_eq!(existing.range.start, r.check_in);

        assert_eq!(reservation("garbled").booking_status(), BookingStatus::Pending);
    }
}
