//! Quota-to-currency rendering.
//!
//! The backend tracks balances in fine-grained quota units; the console
//! shows them as a dollar figure. The conversion is display-only; nothing
//! in the flows does arithmetic on the rendered string.

use rust_decimal::{Decimal, RoundingStrategy};

/// Backend quota units per displayed currency unit.
pub const QUOTA_PER_UNIT: i64 = 500_000;

/// Renders a raw quota value as a currency string, e.g. `$2.47`.
///
/// Always two decimal places, midpoints rounded away from zero to match the
/// console's display convention.
#[must_use]
pub fn format_quota(quota: i64) -> String {
    let units = (Decimal::from(quota) / Decimal::from(QUOTA_PER_UNIT))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${units:.2}")
}
