//! Bet Settlement
//!
//! Converts one bet into its financial outcome.
//!
//! Profit excludes the returned stake:
//!     American, o > 0:  profit = s * o / 100
//!     American, o < 0:  profit = s * 100 / |o|
//!     Decimal d:        profit = s * (d - 1)
//!
//! Implied probability:
//!     American, o > 0:  100 / (o + 100)
//!     American, o < 0:  |o| / (|o| + 100)
//!     Decimal d:        1 / d
//!
//! Every function here is total: zero or unparseable inputs produce 0, never
//! NaN or infinity.

use serde::{Deserialize, Serialize};

use crate::models::{Bet, BetResult, OddsType};

/// Settled figures for a single bet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Realized profit (0 unless Won or Lost)
    pub profit: f64,
    /// Stake plus profit as if the bet had won
    pub payout_if_win: f64,
    pub implied_probability: f64,
}

/// Coerce user-entered text to a finite number, 0 when it does not parse
///
/// # Examples
/// ```
/// use betledger::core::to_number;
/// assert_eq!(to_number(" 12.5 "), 12.5);
/// assert_eq!(to_number("+150"), 150.0);
/// assert_eq!(to_number("abc"), 0.0);
/// assert_eq!(to_number("inf"), 0.0);
/// ```
pub fn to_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Net profit of a winning bet at American odds
pub fn american_profit(stake: f64, odds: f64) -> f64 {
    if stake <= 0.0 || odds == 0.0 {
        return 0.0;
    }

    if odds > 0.0 {
        stake * odds / 100.0
    } else {
        stake * 100.0 / odds.abs()
    }
}

/// Net profit of a winning bet at decimal odds
pub fn decimal_profit(stake: f64, odds: f64) -> f64 {
    if stake <= 0.0 || odds == 0.0 {
        return 0.0;
    }

    stake * (odds - 1.0)
}

/// Profit the bet would book if it won, whatever its actual result
pub fn profit_if_won(bet: &Bet) -> f64 {
    let stake = to_number(&bet.stake);
    let odds = to_number(&bet.odds);

    match bet.odds_type {
        OddsType::American => american_profit(stake, odds),
        OddsType::Decimal => decimal_profit(stake, odds),
    }
}

/// Realized profit for a bet given its result
pub fn profit_for_bet(bet: &Bet) -> f64 {
    match bet.result {
        BetResult::Won => profit_if_won(bet),
        BetResult::Lost => -to_number(&bet.stake),
        BetResult::Pending | BetResult::Push | BetResult::Void => 0.0,
    }
}

/// Total returned on a win (stake included)
pub fn payout_if_win(bet: &Bet) -> f64 {
    let stake = to_number(&bet.stake);
    let stake = if stake > 0.0 { stake } else { 0.0 };
    stake + profit_if_won(bet)
}

/// Break-even win probability embedded in an odds quote
pub fn implied_prob(odds_type: OddsType, odds: &str) -> f64 {
    let o = to_number(odds);
    if o == 0.0 {
        return 0.0;
    }

    match odds_type {
        OddsType::Decimal => 1.0 / o,
        OddsType::American if o > 0.0 => 100.0 / (o + 100.0),
        OddsType::American => o.abs() / (o.abs() + 100.0),
    }
}

/// Settle one bet
pub fn settle(bet: &Bet) -> Settlement {
    Settlement {
        profit: profit_for_bet(bet),
        payout_if_win: payout_if_win(bet),
        implied_probability: implied_prob(bet.odds_type, &bet.odds),
    }
}
