//! Database queries for the booking workflow.
//!
//! Queries take any Postgres executor so they can run on the pool or inside
//! the booking transaction.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::AppError;

use super::availability::{BookingStatus, DateRange};
use super::models::{NewReservation, Property, Reservation};

const PROPERTY_COLUMNS: &str = r#"
    id, slug, name, currency, nightly_rate,
    weekly_discount_percent, monthly_discount_percent,
    cleaning_fee, service_fee_rate, tax_rate,
    min_nights, max_guests, active, deleted_at
"#;

const RESERVATION_COLUMNS: &str = r#"
    id, property_id, guest_name, guest_email, guests_count,
    check_in, check_out, nights, status, currency,
    subtotal, discount_amount, cleaning_fee, service_fee, tax, total,
    created_at
"#;

/// Get a bookable property by id
pub async fn get_property<'e, E>(executor: E, property_id: Uuid) -> Result<Option<Property>, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 AND active = true AND deleted_at IS NULL"
    );
    let property = sqlx::query_as::<_, Property>(&sql)
        .bind(property_id)
        .fetch_optional(executor)
        .await?;

    Ok(property)
}

/// Get a property and take a row lock on it.
///
/// Serialises concurrent bookings for the same unit until the surrounding
/// transaction ends.
pub async fn lock_property<'e, E>(executor: E, property_id: Uuid) -> Result<Option<Property>, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties \
         WHERE id = $1 AND active = true AND deleted_at IS NULL \
         FOR UPDATE"
    );
    let property = sqlx::query_as::<_, Property>(&sql)
        .bind(property_id)
        .fetch_optional(executor)
        .await?;

    Ok(property)
}

/// Get all bookable properties (for cache warming)
pub async fn get_active_properties(pool: &PgPool) -> Result<Vec<Property>, AppError> {
    let sql = format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties WHERE active = true AND deleted_at IS NULL"
    );
    let properties = sqlx::query_as::<_, Property>(&sql).fetch_all(pool).await?;

    Ok(properties)
}

/// Reservations for one unit whose dates touch the given window.
///
/// Statuses are not filtered here; the availability checker decides which
/// ones block.
pub async fn find_reservations_in_window<'e, E>(
    executor: E,
    property_id: Uuid,
    window: &DateRange,
) -> Result<Vec<Reservation>, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations \
         WHERE property_id = $1 \
           AND check_in < $3 \
           AND check_out > $2 \
         ORDER BY check_in"
    );
    let reservations = sqlx::query_as::<_, Reservation>(&sql)
        .bind(property_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(executor)
        .await?;

    Ok(reservations)
}

/// Insert a reservation and return the stored row
pub async fn insert_reservation<'e, E>(executor: E, new: &NewReservation) -> Result<Reservation, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO reservations ( \
             id, property_id, guest_name, guest_email, guests_count, \
             check_in, check_out, nights, status, currency, \
             subtotal, discount_amount, cleaning_fee, service_fee, tax, total \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {RESERVATION_COLUMNS}"
    );
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(Uuid::new_v4())
        .bind(new.property_id)
        .bind(&new.guest_name)
        .bind(&new.guest_email)
        .bind(new.guests_count)
        .bind(new.range.start)
        .bind(new.range.end)
        .bind(new.nights)
        .bind(new.status.as_str())
        .bind(&new.currency)
        .bind(new.subtotal)
        .bind(new.discount_amount)
        .bind(new.cleaning_fee)
        .bind(new.service_fee)
        .bind(new.tax)
        .bind(new.total)
        .fetch_one(executor)
        .await?;

    Ok(reservation)
}

/// Get a reservation by id, locking the row
pub async fn lock_reservation<'e, E>(executor: E, reservation_id: Uuid) -> Result<Option<Reservation>, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE");
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?;

    Ok(reservation)
}

/// Set a reservation's status
pub async fn update_reservation_status<'e, E>(
    executor: E,
    reservation_id: Uuid,
    status: BookingStatus,
) -> Result<Reservation, AppError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
    );
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(reservation_id)
        .bind(status.as_str())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Reservation"))?;

    Ok(reservation)
}
