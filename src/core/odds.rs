//! Odds convention conversion for display
//!
//! Bets keep the convention they were entered in; these helpers only render
//! them in the other convention when the viewer asks for it.

use super::settlement::to_number;
use crate::models::{Bet, OddsType};

/// American odds to decimal, `None` for zero
pub fn american_to_decimal(american: f64) -> Option<f64> {
    if american == 0.0 || !american.is_finite() {
        return None;
    }

    if american > 0.0 {
        Some(1.0 + american / 100.0)
    } else {
        Some(1.0 + 100.0 / american.abs())
    }
}

/// Decimal odds to American, rounded to a whole number
///
/// Returns `None` for 0 and for exactly 1.0, where the conversion divides by
/// zero.
pub fn decimal_to_american(decimal: f64) -> Option<i64> {
    if decimal == 0.0 || decimal == 1.0 || !decimal.is_finite() {
        return None;
    }

    let american = if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else {
        -100.0 / (decimal - 1.0)
    };

    if !american.is_finite() {
        return None;
    }

    // halves go toward +inf
    Some((american + 0.5).floor() as i64)
}

/// American odds with an explicit sign for positive values
pub fn format_american(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Odds text for a bet as seen in `view`
///
/// Matching conventions show what was entered; otherwise the converted value,
/// or an empty string when there is nothing sensible to show.
pub fn display_odds(bet: &Bet, view: OddsType) -> String {
    match (bet.odds_type, view) {
        (OddsType::American, OddsType::Decimal) => american_to_decimal(to_number(&bet.odds))
            .map(|d| format!("{:.2}", d))
            .unwrap_or_default(),
        (OddsType::Decimal, OddsType::American) => decimal_to_american(to_number(&bet.odds))
            .map(format_american)
            .unwrap_or_default(),
        _ => bet.odds.clone(),
    }
}
