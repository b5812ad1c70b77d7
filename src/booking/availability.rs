//! Calendar availability checks.
//!
//! Pure predicates over in-memory date ranges - no database access.
//! The caller fetches the reservations for a single rental unit and hands
//! them in; nothing here filters by unit.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::calculators::PricingError;

/// Half-open stay interval `[start, end)`.
///
/// A guest checking out on day X never collides with a guest checking in on day X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PricingError> {
        if end <= start {
            return Err(PricingError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range without validation.
    ///
    /// Used when the range comes straight from user input and is validated
    /// later by `compute_price`.
    pub const fn unchecked(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range from check-in / check-out calendar dates (midnight UTC).
    pub fn from_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, PricingError> {
        Self::new(midnight_utc(check_in), midnight_utc(check_out))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when the two half-open ranges share at least one instant.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Reservation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    Rejected,
}

/// Statuses that occupy the calendar.
pub const DEFAULT_BLOCKING_STATUSES: [BookingStatus; 3] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::CheckedIn,
];

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
        }
    }

    /// Whether a reservation in this status blocks other stays.
    pub fn is_blocking(&self) -> bool {
        DEFAULT_BLOCKING_STATUSES.contains(self)
    }

    /// Whether a guest may still cancel from this status.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised status string read from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "checked_out" => Ok(BookingStatus::CheckedOut),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            "rejected" => Ok(BookingStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A stored reservation for the same rental unit as the candidate stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingReservation {
    pub range: DateRange,
    pub status: BookingStatus,
}

impl ExistingReservation {
    pub fn new(range: DateRange, status: BookingStatus) -> Self {
        Self { range, status }
    }
}

/// Check a candidate stay against existing reservations using the default
/// blocking statuses (pending, confirmed, checked-in).
pub fn has_conflict(candidate: &DateRange, existing: &[ExistingReservation]) -> bool {
    has_conflict_with(candidate, existing, &DEFAULT_BLOCKING_STATUSES)
}

/// Check a candidate stay against existing reservations, counting only
/// reservations whose status is in `blocking`.
pub fn has_conflict_with(
    candidate: &DateRange,
    existing: &[ExistingReservation],
    blocking: &[BookingStatus],
) -> bool {
    existing
        .iter()
        .filter(|r| blocking.contains(&r.status))
        .any(|r| r.range.overlaps(candidate))
}

/// All blocking reservations that overlap the candidate stay.
pub fn conflicting_reservations<'a>(
    candidate: &DateRange,
    existing: &'a [ExistingReservation],
) -> Vec<&'a ExistingReservation> {
    existing
        .iter()
        .filter(|r| r.status.is_blocking() && r.range.overlaps(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::from_dates(start, end).unwrap()
    }

    fn reservation(start: NaiveDate, end: NaiveDate, status: BookingStatus) -> ExistingReservation {
        ExistingReservation::new(range(start, end), status)
    }

    // ==================== DateRange tests ====================

    #[test]
    fn test_date_range_rejects_empty_and_inverted() {
        assert!(DateRange::from_dates(day(1, 5), day(1, 5)).is_err());
        assert!(DateRange::from_dates(day(1, 6), day(1, 5)).is_err());
        assert!(DateRange::from_dates(day(1, 5), day(1, 6)).is_ok());
    }

    #[test]
    fn test_date_range_from_dates_uses_midnight_utc() {
        let r = range(day(1, 1), day(1, 2));
        assert_eq!(r.start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(r.duration(), Duration::days(1));
    }

    #[test]
    fn test_date_range_contains_is_half_open() {
        let r = range(day(1, 1), day(1, 5));
        assert!(r.contains(r.start));
        assert!(!r.contains(r.end));
    }

    // ==================== has_conflict tests ====================

    #[test]
    fn test_back_to_back_stays_do_not_conflict() {
        let candidate = range(day(1, 1), day(1, 5));
        let existing = vec![reservation(day(1, 5), day(1, 10), BookingStatus::Confirmed)];
        assert!(!has_conflict(&candidate, &existing));

        // Touching on the other side
        let candidate = range(day(3, 10), day(3, 15));
        let existing = vec![reservation(day(3, 1), day(3, 10), BookingStatus::Confirmed)];
        assert!(!has_conflict(&candidate, &existing));
    }

    #[test]
    fn test_overlapping_stays_conflict() {
        let candidate = range(day(1, 1), day(1, 10));
        let existing = vec![reservation(day(1, 5), day(1, 7), BookingStatus::Confirmed)];
        assert!(has_conflict(&candidate, &existing));

        let candidate = range(day(3, 10), day(3, 15));
        let existing = vec![reservation(day(3, 12), day(3, 20), BookingStatus::Pending)];
        assert!(has_conflict(&candidate, &existing));
    }

    #[test]
    fn test_candidate_inside_existing_conflicts() {
        let candidate = range(day(1, 3), day(1, 4));
        let existing = vec![reservation(day(1, 1), day(1, 10), BookingStatus::CheckedIn)];
        assert!(has_conflict(&candidate, &existing));
    }

    #[test]
    fn test_non_blocking_statuses_never_block() {
        let candidate = range(day(1, 1), day(1, 10));
        for status in [
            BookingStatus::Cancelled,
            BookingStatus::Rejected,
            BookingStatus::CheckedOut,
        ] {
            let existing = vec![reservation(day(1, 2), day(1, 8), status)];
            assert!(!has_conflict(&candidate, &existing), "{} blocked", status);
        }
    }

    #[test]
    fn test_empty_reservation_list_is_free() {
        let candidate = range(day(1, 1), day(1, 10));
        assert!(!has_conflict(&candidate, &[]));
    }

    #[test]
    fn test_conflict_is_symmetric() {
        let pairs = [
            (range(day(1, 1), day(1, 5)), range(day(1, 5), day(1, 10))),
            (range(day(1, 1), day(1, 10)), range(day(1, 5), day(1, 7))),
            (range(day(1, 3), day(1, 8)), range(day(1, 1), day(1, 4))),
            (range(day(2, 1), day(2, 3)), range(day(1, 1), day(1, 4))),
        ];
        for (a, b) in pairs {
            let a_vs_b = has_conflict(&a, &[ExistingReservation::new(b, BookingStatus::Confirmed)]);
            let b_vs_a = has_conflict(&b, &[ExistingReservation::new(a, BookingStatus::Confirmed)]);
            assert_eq!(a_vs_b, b_vs_a, "asymmetric for {} / {}", a, b);
        }
    }

    #[test]
    fn test_has_conflict_with_custom_blocking_set() {
        let candidate = range(day(1, 1), day(1, 10));
        let existing = vec![reservation(day(1, 2), day(1, 8), BookingStatus::Pending)];

        // Only confirmed stays block
        assert!(!has_conflict_with(&candidate, &existing, &[BookingStatus::Confirmed]));
        assert!(has_conflict_with(&candidate, &existing, &[BookingStatus::Pending]));
        assert!(!has_conflict_with(&candidate, &existing, &[]));
    }

    #[test]
    fn test_conflicting_reservations_lists_only_blocking_overlaps() {
        let candidate = range(day(1, 1), day(1, 10));
        let existing = vec![
            reservation(day(1, 2), day(1, 4), BookingStatus::Confirmed),
            reservation(day(1, 4), day(1, 6), BookingStatus::Cancelled),
            reservation(day(1, 10), day(1, 12), BookingStatus::Confirmed),
            reservation(day(1, 8), day(1, 11), BookingStatus::Pending),
        ];
        let conflicts = conflicting_reservations(&candidate, &existing);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].status, BookingStatus::Confirmed);
        assert_eq!(conflicts[1].status, BookingStatus::Pending);
    }

    // ==================== BookingStatus tests ====================

    #[test]
    fn test_booking_status_parse_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
            BookingStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert_eq!("CANCELED".parse::<BookingStatus>(), Ok(BookingStatus::Cancelled));
        assert!("archived".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_booking_status_blocking_and_cancellable() {
        assert!(BookingStatus::Pending.is_blocking());
        assert!(BookingStatus::CheckedIn.is_blocking());
        assert!(!BookingStatus::Cancelled.is_blocking());
        assert!(BookingStatus::Confirmed.is_cancellable());
        assert!(!BookingStatus::CheckedIn.is_cancellable());
    }
}
