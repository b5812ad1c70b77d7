//! Booking workflow functions with database access.
//!
//! A booking request first checks availability, then prices the stay. The two
//! core components stay pure; everything here is composition plus I/O.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::config::Config;
use crate::error::{AppError, Result};

use super::availability::{
    conflicting_reservations, has_conflict, BookingStatus, DateRange, ExistingReservation,
};
use super::calculators::{check_minimum_stay, compute_price, count_nights, PriceBreakdown};
use super::models::{NewReservation, Property, Reservation};
use super::queries;
use super::requests::{CalculatePriceRequest, CreateBookingRequest, QuoteRequest};

/// Result of an availability check
#[derive(Debug, Clone)]
pub struct AvailabilityResult {
    pub available: bool,
    pub conflicts: Vec<ExistingReservation>,
}

/// Result of a property quote
#[derive(Debug, Clone)]
pub struct BookingQuote {
    pub property: Arc<Property>,
    pub range: DateRange,
    pub breakdown: PriceBreakdown,
    pub availability: AvailabilityResult,
    pub meets_minimum_stay: bool,
    pub guests_allowed: bool,
}

/// Price a stay from explicit parameters, without touching the database.
pub fn calculate_price(config: &Config, request: &CalculatePriceRequest) -> Result<PriceBreakdown> {
    request.validate()?;
    let input = request.to_price_input(config.default_service_fee_rate, config.default_tax_rate);
    Ok(compute_price(&input)?)
}

/// Check a candidate stay against an in-memory reservation list.
pub fn check_candidate(candidate: &DateRange, existing: &[ExistingReservation]) -> AvailabilityResult {
    let available = !has_conflict(candidate, existing);
    let conflicts = if available {
        Vec::new()
    } else {
        conflicting_reservations(candidate, existing)
            .into_iter()
            .cloned()
            .collect()
    };
    AvailabilityResult {
        available,
        conflicts,
    }
}

/// Load a property, cache first.
pub async fn load_property(pool: &PgPool, cache: &AppCache, property_id: Uuid) -> Result<Arc<Property>> {
    if let Some(cached) = cache.properties.get(&property_id).await {
        debug!("Cache HIT for property: {}", property_id);
        if !cached.is_bookable() {
            return Err(AppError::NotFound("Property"));
        }
        return Ok(cached);
    }

    debug!("Cache MISS for property: {}", property_id);
    let property = queries::get_property(pool, property_id)
        .await?
        .ok_or(AppError::NotFound("Property"))?;
    let property = Arc::new(property);
    cache.properties.insert(property_id, property.clone()).await;

    Ok(property)
}

/// Check whether a property is free for the given stay.
pub async fn check_availability(
    pool: &PgPool,
    cache: &AppCache,
    property_id: Uuid,
    range: &DateRange,
) -> Result<AvailabilityResult> {
    let property = load_property(pool, cache, property_id).await?;
    let existing = fetch_existing(pool, property.id, range).await?;
    let result = check_candidate(range, &existing);

    debug!(
        "Availability for property {} over {}: available={} ({} candidate reservations)",
        property.id,
        range,
        result.available,
        existing.len()
    );

    Ok(result)
}

/// Quote a stay at a property.
///
/// A stay below the property's minimum or over its guest limit is still
/// priced; the quote only flags it. Booking creation rejects it.
pub async fn quote_booking(
    pool: &PgPool,
    cache: &AppCache,
    config: &Config,
    property_id: Uuid,
    request: &QuoteRequest,
) -> Result<BookingQuote> {
    let range = DateRange::from_dates(request.check_in, request.check_out)?;
    let property = load_property(pool, cache, property_id).await?;

    let input = property.price_input(range, config.default_service_fee_rate, config.default_tax_rate);
    let breakdown = compute_price(&input)?;

    let existing = fetch_existing(pool, property.id, &range).await?;
    let availability = check_candidate(&range, &existing);

    let meets_minimum_stay = check_minimum_stay(breakdown.nights, i64::from(property.min_nights)).is_ok();
    let guests_allowed = request
        .guests_count
        .map_or(true, |guests| guests >= 1 && guests <= property.max_guests);

    Ok(BookingQuote {
        property,
        range,
        breakdown,
        availability,
        meets_minimum_stay,
        guests_allowed,
    })
}

/// Create a pending reservation.
///
/// The property row is locked for the whole transaction, so two requests for
/// the same unit cannot both pass the availability check.
pub async fn create_booking(pool: &PgPool, config: &Config, request: &CreateBookingRequest) -> Result<Reservation> {
    request.validate()?;
    let range = DateRange::from_dates(request.check_in, request.check_out)?;

    let mut tx = pool.begin().await?;

    let property = queries::lock_property(&mut *tx, request.property_id)
        .await?
        .ok_or(AppError::NotFound("Property"))?;

    if request.guests_count > property.max_guests {
        return Err(AppError::Validation(format!(
            "{} allows at most {} guests",
            property.name, property.max_guests
        )));
    }

    check_minimum_stay(count_nights(&range), i64::from(property.min_nights))?;

    let existing = fetch_existing(&mut *tx, property.id, &range).await?;
    if has_conflict(&range, &existing) {
        let conflicts: Vec<ExistingReservation> = conflicting_reservations(&range, &existing)
            .into_iter()
            .cloned()
            .collect();
        info!(
            "Booking rejected for property {} over {}: {} conflicting reservation(s)",
            property.id,
            range,
            conflicts.len()
        );
        return Err(AppError::Conflict {
            message: format!(
                "{} is not available from {} to {}",
                property.name, request.check_in, request.check_out
            ),
            conflicts,
        });
    }

    let input = property.price_input(range, config.default_service_fee_rate, config.default_tax_rate);
    let breakdown = compute_price(&input)?;
    let nights = i32::try_from(breakdown.nights)
        .map_err(|_| AppError::Validation("Stay is too long".to_string()))?;

    let new = NewReservation {
        property_id: property.id,
        guest_name: request.guest_name.trim().to_string(),
        guest_email: request.guest_email.trim().to_lowercase(),
        guests_count: request.guests_count,
        range,
        nights,
        status: BookingStatus::Pending,
        currency: property.currency.clone(),
        subtotal: breakdown.subtotal,
        discount_amount: breakdown.discount_amount,
        cleaning_fee: breakdown.cleaning_fee,
        service_fee: breakdown.service_fee,
        tax: breakdown.tax,
        total: breakdown.total,
    };
    let reservation = queries::insert_reservation(&mut *tx, &new).await?;

    tx.commit().await?;

    info!(
        "Reservation {} created for property {} ({} nights, total {} {})",
        reservation.id, property.id, reservation.nights, reservation.total, reservation.currency
    );

    Ok(reservation)
}

/// Cancel a pending or confirmed reservation.
pub async fn cancel_booking(pool: &PgPool, reservation_id: Uuid) -> Result<Reservation> {
    let mut tx = pool.begin().await?;

    let reservation = queries::lock_reservation(&mut *tx, reservation_id)
        .await?
        .ok_or(AppError::NotFound("Reservation"))?;

    let status = reservation.booking_status();
    if !status.is_cancellable() {
        return Err(AppError::Validation(format!(
            "Reservation in status '{}' cannot be cancelled",
            status
        )));
    }

    let cancelled =
        queries::update_reservation_status(&mut *tx, reservation_id, BookingStatus::Cancelled).await?;

    tx.commit().await?;

    info!("Reservation {} cancelled (was {})", reservation_id, status);

    Ok(cancelled)
}

async fn fetch_existing<'e, E>(executor: E, property_id: Uuid, range: &DateRange) -> Result<Vec<ExistingReservation>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = queries::find_reservations_in_window(executor, property_id, range).await?;
    Ok(rows.iter().map(Reservation::as_existing).collect())
}
