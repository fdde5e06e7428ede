//! Ledger aggregation over a bet collection
//!
//! [`aggregate`] takes one snapshot of the collection plus the current filter
//! and derives everything a view needs from it in a single pass, so the
//! table, the statistics and the equity curve always agree.

pub mod filter;
pub mod metrics;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use filter::{filter_bets, FilterSpec, ResultFilter, SportFilter};
pub use metrics::{
    breakdown, calculate_performance, calculate_stats, equity_curve, max_drawdown, round2,
    Dimension, DimensionAnalysis, EquityPoint, LedgerStats, PerformanceMetrics,
};

use crate::models::Bet;

/// Everything derived from one aggregation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReport {
    /// Filtered bets, most recent first
    pub bets: Vec<Bet>,
    pub stats: LedgerStats,
    pub equity_curve: Vec<EquityPoint>,
    pub performance: PerformanceMetrics,
    /// Ids of filtered bets whose date did not parse and were treated as "now"
    pub undated: Vec<String>,
}

/// Aggregate using the current time for unparseable dates
pub fn aggregate(bets: &[Bet], filter: &FilterSpec) -> LedgerReport {
    aggregate_at(bets, filter, Utc::now().timestamp_millis())
}

/// Aggregate with an explicit "now" in epoch milliseconds
pub fn aggregate_at(bets: &[Bet], filter: &FilterSpec, now_ms: i64) -> LedgerReport {
    let rows = filter_bets(bets, filter, now_ms);

    let stats = calculate_stats(rows.iter().copied());
    let curve = equity_curve(rows.iter().copied(), now_ms);
    let performance = calculate_performance(rows.iter().copied(), &curve);
    let undated = rows
        .iter()
        .filter(|b| b.parsed_date().is_none())
        .map(|b| b.id.clone())
        .collect();

    LedgerReport {
        bets: rows.into_iter().cloned().collect(),
        stats,
        equity_curve: curve,
        performance,
        undated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetResult, NewBet, OddsType};

    const NOW: i64 = 1_735_689_600_000;

    fn bet(id: &str, date: &str, odds_type: OddsType, odds: &str, stake: &str, result: BetResult) -> Bet {
        NewBet {
            date: date.to_string(),
            sport: "NFL".to_string(),
            odds_type,
            odds: odds.to_string(),
            stake: stake.to_string(),
            result,
            ..NewBet::default()
        }
        .into_bet(id.to_string())
    }

    #[test]
    fn test_aggregate_scenario() {
        let bets = vec![
            bet("w", "2024-01-10", OddsType::American, "-110", "100", BetResult::Won),
            bet("l", "2024-01-11", OddsType::Decimal, "2.0", "50", BetResult::Lost),
        ];

        let report = aggregate_at(&bets, &FilterSpec::default(), NOW);

        assert_eq!(report.stats.count, 2);
        assert!((report.stats.realized - 40.91).abs() < 0.01);
        assert!((report.stats.total_stake - 150.0).abs() < 1e-9);
        assert!((report.stats.roi - 27.27).abs() < 0.01);
        assert_eq!(report.bets[0].id, "l");
        assert_eq!(report.equity_curve.len(), 2);
        assert_eq!(report.equity_curve[1].cumulative_profit, 40.91);
        assert!(report.undated.is_empty());
    }

    #[test]
    fn test_aggregate_curve_length_matches_settled_count() {
        let bets = vec![
            bet("a", "2024-01-01", OddsType::Decimal, "2.0", "10", BetResult::Won),
            bet("b", "2024-01-02", OddsType::Decimal, "2.0", "10", BetResult::Pending),
            bet("c", "2024-01-03", OddsType::Decimal, "2.0", "10", BetResult::Void),
            bet("d", "2024-01-04", OddsType::Decimal, "2.0", "10", BetResult::Lost),
        ];

        let report = aggregate_at(&bets, &FilterSpec::default(), NOW);
        let settled = report
            .bets
            .iter()
            .filter(|b| b.result != BetResult::Pending)
            .count();
        assert_eq!(report.equity_curve.len(), settled);
        assert_eq!(report.equity_curve.len(), 3);
    }

    #[test]
    fn test_aggregate_stats_follow_filter() {
        let bets = vec![
            bet("a", "2024-01-01", OddsType::Decimal, "3.0", "10", BetResult::Won),
            bet("b", "2024-01-02", OddsType::Decimal, "2.0", "40", BetResult::Lost),
        ];
        let filter = FilterSpec {
            result: ResultFilter::Only(BetResult::Won),
            ..FilterSpec::default()
        };

        let report = aggregate_at(&bets, &filter, NOW);
        assert_eq!(report.stats.count, 1);
        assert!((report.stats.realized - 20.0).abs() < 1e-9);
        assert!((report.stats.roi - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_zero_stake_roi() {
        let bets = vec![bet("a", "2024-01-01", OddsType::American, "+100", "", BetResult::Won)];
        let report = aggregate_at(&bets, &FilterSpec::default(), NOW);

        assert_eq!(report.stats.total_stake, 0.0);
        assert_eq!(report.stats.roi, 0.0);
    }

    #[test]
    fn test_aggregate_flags_undated_bets() {
        let bets = vec![
            bet("ok", "2024-01-01", OddsType::Decimal, "2.0", "10", BetResult::Won),
            bet("bad", "next tuesday", OddsType::Decimal, "2.0", "10", BetResult::Won),
        ];

        let report = aggregate_at(&bets, &FilterSpec::default(), NOW);
        assert_eq!(report.undated, vec!["bad".to_string()]);
    }

    #[test]
    fn test_aggregate_does_not_touch_input() {
        let bets = vec![bet("a", "2024-01-01", OddsType::Decimal, "2.0", "10", BetResult::Won)];
        let before = bets.clone();

        let first = aggregate_at(&bets, &FilterSpec::default(), NOW);
        let second = aggregate_at(&bets, &FilterSpec::default(), NOW);

        assert_eq!(bets, before);
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.equity_curve, second.equity_curve);
    }
}
