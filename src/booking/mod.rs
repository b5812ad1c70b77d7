//! Booking engine module.
//!
//! Stay pricing and calendar availability for the rental listings, plus the
//! booking workflow that composes them over Postgres.

pub mod availability;
pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use availability::{has_conflict, has_conflict_with, BookingStatus, DateRange, ExistingReservation};
pub use calculators::{compute_price, round_money, PriceBreakdown, PriceInput, PricingError};
pub use routes::{calculator_router, router};
