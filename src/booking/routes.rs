//! HTTP routes for the booking API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::AppState;

use super::availability::DateRange;
use super::requests::{
    CalculatePriceRequest, CheckAvailabilityRequest, CreateBookingRequest, QuoteRequest,
    StayDatesQuery,
};
use super::responses::{
    AvailabilityResponse, PriceBreakdownResponse, QuoteResponse, ReservationResponse,
};
use super::services::{self, AvailabilityResult};

/// Routes backed by the database
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/properties/:id/quote", post(quote))
        .route("/api/properties/:id/availability", get(availability))
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/:id/cancel", post(cancel_booking))
}

/// Stateless calculation routes; only need configuration defaults
pub fn calculator_router<S>(config: Arc<Config>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/pricing/calculate", post(calculate_price))
        .route("/api/availability/check", post(check_availability))
        .with_state(config)
}

impl From<AvailabilityResult> for AvailabilityResponse {
    fn from(result: AvailabilityResult) -> Self {
        Self {
            available: result.available,
            conflicts: result.conflicts.iter().map(Into::into).collect(),
        }
    }
}

/// POST /api/pricing/calculate
async fn calculate_price(
    State(config): State<Arc<Config>>,
    Json(request): Json<CalculatePriceRequest>,
) -> Result<Json<PriceBreakdownResponse>> {
    let breakdown = services::calculate_price(&config, &request)?;
    let currency = request
        .currency
        .as_deref()
        .unwrap_or(&config.default_currency);

    Ok(Json(PriceBreakdownResponse::from_breakdown(&breakdown, currency)))
}

/// POST /api/availability/check
async fn check_availability(
    Json(request): Json<CheckAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>> {
    let candidate = DateRange::new(request.candidate.start, request.candidate.end)?;
    for reservation in &request.existing {
        DateRange::new(reservation.range.start, reservation.range.end)?;
    }
    let result = services::check_candidate(&candidate, &request.existing);

    Ok(Json(result.into()))
}

/// POST /api/properties/:id/quote
async fn quote(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let quote =
        services::quote_booking(&state.db, &state.cache, &state.config, property_id, &request).await?;

    Ok(Json(QuoteResponse {
        property_id: quote.property.id,
        property_name: quote.property.name.clone(),
        check_in: quote.range.start,
        check_out: quote.range.end,
        available: quote.availability.available,
        min_nights: quote.property.min_nights,
        meets_minimum_stay: quote.meets_minimum_stay,
        guests_allowed: quote.guests_allowed,
        price: PriceBreakdownResponse::from_breakdown(&quote.breakdown, &quote.property.currency),
    }))
}

/// GET /api/properties/:id/availability?check_in=..&check_out=..
async fn availability(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(query): Query<StayDatesQuery>,
) -> Result<Json<AvailabilityResponse>> {
    let range = query.range()?;
    let result = services::check_availability(&state.db, &state.cache, property_id, &range).await?;

    Ok(Json(result.into()))
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>)> {
    let reservation = services::create_booking(&state.db, &state.config, &request).await?;

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

/// POST /api/bookings/:id/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationResponse>> {
    let reservation = services::cancel_booking(&state.db, reservation_id).await?;

    Ok(Json(reservation.into()))
}
