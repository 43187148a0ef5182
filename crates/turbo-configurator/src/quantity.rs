//! Decimal quantity helpers.
//!
//! Quantities stay at full precision through every computation. Rounding to a
//! display or storage scale happens only through [`round_for_display`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ConfiguratorError;

/// Default number of decimal places for persisted and displayed quantities.
pub const DEFAULT_DISPLAY_SCALE: u32 = 2;

/// Round a quantity half away from zero to `scale` decimal places.
pub fn round_for_display(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject negative values at authoring time.
pub fn ensure_non_negative(field: &str, value: Decimal) -> Result<Decimal, ConfiguratorError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfiguratorError::NegativeQuantity {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

/// `a * b`, clamped to the largest representable magnitude on overflow.
pub fn clamped_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "quantity overflow in multiply, clamping");
        a.saturating_mul(b)
    })
}

/// `a + b`, clamped to the largest representable magnitude on overflow.
pub fn clamped_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        tracing::warn!(%a, %b, "quantity overflow in add, clamping");
        a.saturating_add(b)
    })
}

/// Whole units that `available` covers at `required` per unit.
///
/// Negative stock counts as none. Ratios beyond `u64` saturate.
pub fn whole_units(available: Decimal, required: Decimal) -> u64 {
    if required <= Decimal::ZERO || available <= Decimal::ZERO {
        return 0;
    }
    match available.checked_div(required) {
        Some(ratio) => ratio.floor().to_u64().unwrap_or(u64::MAX),
        None => u64::MAX,
    }
}
