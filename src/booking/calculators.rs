//! Core stay pricing functions.
//!
//! Pure functions for booking price math - no database access.
//! Every intermediate that is shown to the guest (per-night rate, service fee,
//! tax) is rounded on its own, so the displayed line items always add up to
//! the displayed total.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::availability::DateRange;

/// Stays of at least this many nights qualify for the weekly discount.
pub const WEEKLY_THRESHOLD_NIGHTS: i64 = 7;

/// Stays of at least this many nights qualify for the monthly discount.
pub const MONTHLY_THRESHOLD_NIGHTS: i64 = 28;

/// Platform service fee applied when the property sets none (12%).
pub const DEFAULT_SERVICE_FEE_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 2);

/// Tax rate applied when the property sets none (13%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(13, 0, 0, false, 2);

/// Finest precision a nightly rate may be quoted in (cents).
pub const MAX_RATE_DECIMAL_PLACES: u32 = 2;

/// Input validation failures raised by the price engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Check-out ({end}) must be after check-in ({start})")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Nightly rate must be positive with at most 2 decimal places, got {rate}")]
    InvalidRate { rate: Decimal },

    #[error("Stay price is too large to compute")]
    AmountOverflow,
}

/// Minimum-stay policy violation. Enforced by the booking workflow, never by
/// `compute_price`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StayPolicyError {
    #[error("Stay of {nights} night(s) is shorter than the {min_nights}-night minimum")]
    BelowMinimumStay { nights: i64, min_nights: i64 },
}

/// Round to specified decimal places using round-half-up
/// (midpoint away from zero).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use stayrental_web::booking::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(537.6), 0), dec!(538));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of billable nights in a stay.
///
/// Any partial day is charged as a full night.
pub fn count_nights(range: &DateRange) -> i64 {
    let stay = range.duration();
    let whole_days = stay.num_days();
    if stay > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    }
}

/// Which long-stay discount was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountTier {
    None,
    Weekly,
    Monthly,
}

impl DiscountTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountTier::None => "none",
            DiscountTier::Weekly => "weekly",
            DiscountTier::Monthly => "monthly",
        }
    }
}

/// Pricing parameters for a single stay
#[derive(Debug, Clone)]
pub struct PriceInput {
    pub nightly_rate: Decimal,
    pub range: DateRange,
    pub weekly_discount_percent: Option<Decimal>,
    pub monthly_discount_percent: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub service_fee_rate: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
}

impl PriceInput {
    /// Input with only a rate and a range; every optional knob unset.
    pub fn new(nightly_rate: Decimal, range: DateRange) -> Self {
        Self {
            nightly_rate,
            range,
            weekly_discount_percent: None,
            monthly_discount_percent: None,
            cleaning_fee: None,
            service_fee_rate: None,
            tax_rate: None,
        }
    }
}

/// Result of a stay price calculation
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub nights: i64,
    pub nightly_rate: Decimal,
    pub effective_nightly_rate: Decimal,
    /// `nights * nightly_rate`, before any discount.
    pub base_amount: Decimal,
    /// `nights * effective_nightly_rate`.
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub discount_percent: Decimal,
    pub discount_tier: DiscountTier,
    pub cleaning_fee: Decimal,
    pub service_fee_rate: Decimal,
    pub service_fee: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Pick the single discount tier that applies, highest tier first.
///
/// Tiers are never cumulative.
pub fn select_discount(
    nights: i64,
    weekly_discount_percent: Option<Decimal>,
    monthly_discount_percent: Option<Decimal>,
) -> (DiscountTier, Decimal) {
    match (monthly_discount_percent, weekly_discount_percent) {
        (Some(monthly), _) if nights >= MONTHLY_THRESHOLD_NIGHTS => (DiscountTier::Monthly, monthly),
        (_, Some(weekly)) if nights >= WEEKLY_THRESHOLD_NIGHTS => (DiscountTier::Weekly, weekly),
        _ => (DiscountTier::None, Decimal::ZERO),
    }
}

/// Decimal places money is rounded to for a given nightly rate.
///
/// Amounts follow the precision the rate is quoted in: a whole-unit rate
/// prices in whole units, a rate with cents prices in cents. Rounding a
/// discounted rate to its own precision can never push it above the rate.
pub fn money_places(nightly_rate: Decimal) -> u32 {
    nightly_rate.normalize().scale()
}

fn checked(amount: Option<Decimal>) -> Result<Decimal, PricingError> {
    amount.ok_or(PricingError::AmountOverflow)
}

/// Compute the full price breakdown for a stay.
///
/// Fails with `InvalidRange` when check-out is not after check-in, with
/// `InvalidRate` when the nightly rate is not positive or finer than cents,
/// and with `AmountOverflow` when an amount leaves the decimal range.
/// Minimum-stay rules are not checked here; see `check_minimum_stay`.
pub fn compute_price(input: &PriceInput) -> Result<PriceBreakdown, PricingError> {
    let range = &input.range;
    if range.end <= range.start {
        return Err(PricingError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }
    if input.nightly_rate <= Decimal::ZERO
        || money_places(input.nightly_rate) > MAX_RATE_DECIMAL_PLACES
    {
        return Err(PricingError::InvalidRate {
            rate: input.nightly_rate,
        });
    }

    let places = money_places(input.nightly_rate);
    let nights = count_nights(range);
    let nights_dec = Decimal::from(nights);

    let (discount_tier, discount_percent) = select_discount(
        nights,
        input.weekly_discount_percent,
        input.monthly_discount_percent,
    );

    // Round the per-night rate so the displayed nightly price is what is charged
    let discounted_rate = checked(
        Decimal::ONE_HUNDRED
            .checked_sub(discount_percent)
            .and_then(|pct| input.nightly_rate.checked_mul(pct))
            .and_then(|r| r.checked_div(Decimal::ONE_HUNDRED)),
    )?;
    let effective_nightly_rate = round_money(discounted_rate, places);

    let subtotal = checked(nights_dec.checked_mul(effective_nightly_rate))?;
    let base_amount = checked(nights_dec.checked_mul(input.nightly_rate))?;
    let discount_amount = checked(base_amount.checked_sub(subtotal))?;

    let cleaning_fee = input.cleaning_fee.unwrap_or(Decimal::ZERO);

    let service_fee_rate = input.service_fee_rate.unwrap_or(DEFAULT_SERVICE_FEE_RATE);
    let service_fee = round_money(checked(subtotal.checked_mul(service_fee_rate))?, places);

    let tax_rate = input.tax_rate.unwrap_or(DEFAULT_TAX_RATE);
    let taxable_amount = checked(
        subtotal
            .checked_add(cleaning_fee)
            .and_then(|a| a.checked_add(service_fee)),
    )?;
    let tax = round_money(checked(taxable_amount.checked_mul(tax_rate))?, places);

    let total = checked(taxable_amount.checked_add(tax))?;

    Ok(PriceBreakdown {
        nights,
        nightly_rate: input.nightly_rate,
        effective_nightly_rate,
        base_amount,
        subtotal,
        discount_amount,
        discount_percent,
        discount_tier,
        cleaning_fee,
        service_fee_rate,
        service_fee,
        tax_rate,
        tax,
        total,
    })
}

/// Enforce a property's minimum-stay policy.
pub fn check_minimum_stay(nights: i64, min_nights: i64) -> Result<(), StayPolicyError> {
    if nights < min_nights {
        return Err(StayPolicyError::BelowMinimumStay { nights, min_nights });
    }
    Ok(())
}
