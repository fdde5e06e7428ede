//! Ledger Metrics
//!
//! Summary statistics, equity curve, drawdown and per-dimension breakdowns
//! over an already filtered set of bets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::filter::timestamp_or;
use crate::core::{profit_for_bet, to_number};
use crate::models::{Bet, BetResult};

/// Headline statistics for the filtered bets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub count: usize,
    pub total_stake: f64,
    pub realized: f64,
    pub pending_stake: f64,
    pub won: usize,
    pub lost: usize,
    pub pending: usize,
    /// Push and Void together
    pub pushes: usize,
    /// Percent of total stake
    pub roi: f64,
}

impl LedgerStats {
    /// Win-loss-push record, e.g. `12-9-1`
    pub fn record(&self) -> String {
        format!("{}-{}-{}", self.won, self.lost, self.pushes)
    }
}

/// One point of the cumulative P&L series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: String,
    pub cumulative_profit: f64,
}

/// Secondary performance figures derived from settled bets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// won / (won + lost); pushes and voids do not count
    pub hit_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
}

/// Analysis results by dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub stake: f64,
    pub profit: f64,
    pub roi: f64,
}

/// Dimensions a breakdown can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Sport,
    Book,
}

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn roi_pct(profit: f64, stake: f64) -> f64 {
    if stake != 0.0 {
        profit / stake * 100.0
    } else {
        0.0
    }
}

/// Calculate headline statistics
pub fn calculate_stats<'a, I>(bets: I) -> LedgerStats
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut stats = LedgerStats::default();

    for bet in bets {
        let stake = to_number(&bet.stake);
        stats.count += 1;
        stats.total_stake += stake;
        stats.realized += profit_for_bet(bet);

        match bet.result {
            BetResult::Won => stats.won += 1,
            BetResult::Lost => stats.lost += 1,
            BetResult::Pending => {
                stats.pending += 1;
                stats.pending_stake += stake;
            }
            BetResult::Push | BetResult::Void => stats.pushes += 1,
        }
    }

    stats.roi = roi_pct(stats.realized, stats.total_stake);
    stats
}

/// Cumulative P&L over settled bets in chronological order
///
/// Only the emitted values are rounded; the running total keeps full
/// precision.
pub fn equity_curve<'a, I>(bets: I, now_ms: i64) -> Vec<EquityPoint>
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut settled: Vec<&Bet> = bets
        .into_iter()
        .filter(|b| b.result != BetResult::Pending)
        .collect();
    settled.sort_by_key(|b| timestamp_or(&b.date, now_ms));

    let mut cumulative = 0.0;
    settled
        .into_iter()
        .map(|b| {
            cumulative += profit_for_bet(b);
            EquityPoint {
                date: b.date.clone(),
                cumulative_profit: round2(cumulative),
            }
        })
        .collect()
}

/// Largest peak-to-trough fall of the equity curve, starting from zero
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;

    for point in curve {
        peak = peak.max(point.cumulative_profit);
        max_drawdown = max_drawdown.max(peak - point.cumulative_profit);
    }

    round2(max_drawdown)
}

/// Calculate performance metrics from bets and their equity curve
pub fn calculate_performance<'a, I>(bets: I, curve: &[EquityPoint]) -> PerformanceMetrics
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut won = 0usize;
    let mut lost = 0usize;
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;

    for bet in bets {
        match bet.result {
            BetResult::Won => won += 1,
            BetResult::Lost => lost += 1,
            _ => {}
        }

        let profit = profit_for_bet(bet);
        if profit > 0.0 {
            gross_profit += profit;
        } else if profit < 0.0 {
            gross_loss += profit.abs();
        }
    }

    let decided = won + lost;
    let hit_rate = if decided > 0 {
        won as f64 / decided as f64
    } else {
        0.0
    };

    // No losses means no finite factor; report 0 rather than infinity
    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else {
        0.0
    };

    PerformanceMetrics {
        hit_rate,
        gross_profit,
        gross_loss,
        profit_factor,
        max_drawdown: max_drawdown(curve),
    }
}

/// Analyze bets grouped by sport or book
///
/// Bets with an empty key are grouped under `-`.
pub fn breakdown<'a, I>(bets: I, dimension: Dimension) -> Vec<DimensionAnalysis>
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut grouped: HashMap<String, Vec<&Bet>> = HashMap::new();
    for bet in bets {
        let key = match dimension {
            Dimension::Sport => bet.sport.trim(),
            Dimension::Book => bet.book.trim(),
        };
        let key = if key.is_empty() { "-" } else { key };
        grouped.entry(key.to_string()).or_default().push(bet);
    }

    let mut results: Vec<DimensionAnalysis> = grouped
        .into_iter()
        .map(|(key, group)| {
            let wins = group.iter().filter(|b| b.result == BetResult::Won).count();
            let stake: f64 = group.iter().map(|b| to_number(&b.stake)).sum();
            let profit: f64 = group.iter().map(|b| profit_for_bet(b)).sum();

            DimensionAnalysis {
                key,
                bets: group.len(),
                wins,
                stake,
                profit,
                roi: roi_pct(profit, stake),
            }
        })
        .collect();

    results.sort_by(|a, b| a.key.cmp(&b.key));
    results
}
