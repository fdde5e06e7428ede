//! Bet filtering and display ordering

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{parse_date_ms, Bet, BetResult};

const DAY_MS: i64 = 24 * 3600 * 1000;

/// Result filter: everything, or one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResultFilter {
    #[default]
    All,
    Only(BetResult),
}

impl FromStr for ResultFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ResultFilter::All)
        } else {
            s.parse().map(ResultFilter::Only)
        }
    }
}

/// Sport filter: everything, or one sport (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SportFilter {
    #[default]
    All,
    Only(String),
}

impl From<&str> for SportFilter {
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("all") {
            SportFilter::All
        } else {
            SportFilter::Only(s.trim().to_string())
        }
    }
}

/// Current filter state. All predicates must hold for a bet to be kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Free-text search over book, sport, event, market and notes
    pub query: String,
    pub result: ResultFilter,
    pub sport: SportFilter,
    /// Inclusive lower date bound, empty for none
    pub from: String,
    /// Inclusive upper date bound, empty for none
    pub to: String,
}

impl FilterSpec {
    pub fn matches(&self, bet: &Bet, now_ms: i64) -> bool {
        self.matches_result(bet)
            && self.matches_sport(bet)
            && self.matches_dates(bet, now_ms)
            && self.matches_query(bet)
    }

    fn matches_result(&self, bet: &Bet) -> bool {
        match self.result {
            ResultFilter::All => true,
            ResultFilter::Only(result) => bet.result == result,
        }
    }

    fn matches_sport(&self, bet: &Bet) -> bool {
        match &self.sport {
            SportFilter::All => true,
            SportFilter::Only(sport) => {
                !bet.sport.is_empty() && bet.sport.to_lowercase() == sport.to_lowercase()
            }
        }
    }

    fn matches_dates(&self, bet: &Bet, now_ms: i64) -> bool {
        let from = self.from.trim();
        let to = self.to.trim();
        if from.is_empty() && to.is_empty() {
            return true;
        }

        let t = timestamp_or(&bet.date, now_ms);
        let lower = if from.is_empty() {
            i64::MIN
        } else {
            timestamp_or(from, now_ms)
        };
        let upper = if to.is_empty() {
            i64::MAX
        } else {
            timestamp_or(to, now_ms).saturating_add(DAY_MS - 1)
        };

        t >= lower && t <= upper
    }

    fn matches_query(&self, bet: &Bet) -> bool {
        let q = self.query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }

        let hay = [&bet.book, &bet.sport, &bet.event, &bet.market, &bet.notes]
            .map(|s| s.as_str())
            .join("\n")
            .to_lowercase();
        hay.contains(&q)
    }
}

/// Timestamp of a date text, falling back to `now_ms` when it does not parse
pub fn timestamp_or(text: &str, now_ms: i64) -> i64 {
    parse_date_ms(text).unwrap_or(now_ms)
}

/// Filter `bets` and order them most recent first
pub fn filter_bets<'a>(bets: &'a [Bet], filter: &FilterSpec, now_ms: i64) -> Vec<&'a Bet> {
    let mut rows: Vec<&Bet> = bets.iter().filter(|b| filter.matches(b, now_ms)).collect();
    rows.sort_by_key(|b| std::cmp::Reverse(timestamp_or(&b.date, now_ms)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBet, OddsType};

    const NOW: i64 = 1_735_689_600_000; // 2025-01-01T00:00:00Z

    fn bet(id: &str, date: &str, sport: &str, result: BetResult) -> Bet {
        NewBet {
            date: date.to_string(),
            sport: sport.to_string(),
            odds_type: OddsType::American,
            odds: "-110".to_string(),
            stake: "10".to_string(),
            result,
            ..NewBet::default()
        }
        .into_bet(id.to_string())
    }

    fn ids(rows: &[&Bet]) -> Vec<String> {
        rows.iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_all_sorted_desc() {
        let bets = vec![
            bet("a", "2024-01-01", "NFL", BetResult::Won),
            bet("b", "2024-03-01", "NBA", BetResult::Lost),
            bet("c", "2024-02-01", "NFL", BetResult::Pending),
        ];

        let rows = filter_bets(&bets, &FilterSpec::default(), NOW);
        assert_eq!(ids(&rows), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_result_filter_exact() {
        let bets = vec![
            bet("a", "2024-01-01", "NFL", BetResult::Won),
            bet("b", "2024-01-02", "NFL", BetResult::Push),
            bet("c", "2024-01-03", "NFL", BetResult::Void),
        ];
        let filter = FilterSpec {
            result: ResultFilter::Only(BetResult::Push),
            ..FilterSpec::default()
        };

        assert_eq!(ids(&filter_bets(&bets, &filter, NOW)), vec!["b"]);
    }

    #[test]
    fn test_sport_filter_case_insensitive_and_empty_never_matches() {
        let bets = vec![
            bet("a", "2024-01-01", "Soccer", BetResult::Won),
            bet("b", "2024-01-02", "soccer", BetResult::Won),
            bet("c", "2024-01-03", "", BetResult::Won),
            bet("d", "2024-01-04", "NHL", BetResult::Won),
        ];
        let filter = FilterSpec {
            sport: SportFilter::from("SOCCER"),
            ..FilterSpec::default()
        };

        assert_eq!(ids(&filter_bets(&bets, &filter, NOW)), vec!["b", "a"]);
    }

    #[test]
    fn test_date_range_inclusive_of_to_day() {
        let bets = vec![
            bet("before", "2024-01-09", "NFL", BetResult::Won),
            bet("from", "2024-01-10", "NFL", BetResult::Won),
            bet("to", "2024-01-20", "NFL", BetResult::Won),
            bet("to_late", "2024-01-20T23:59:59.999Z", "NFL", BetResult::Won),
            bet("after", "2024-01-21", "NFL", BetResult::Won),
        ];
        let filter = FilterSpec {
            from: "2024-01-10".to_string(),
            to: "2024-01-20".to_string(),
            ..FilterSpec::default()
        };

        let mut kept = ids(&filter_bets(&bets, &filter, NOW));
        kept.sort();
        assert_eq!(kept, vec!["from", "to", "to_late"]);
    }

    #[test]
    fn test_open_ended_ranges() {
        let bets = vec![
            bet("old", "2020-06-01", "NFL", BetResult::Won),
            bet("new", "2024-06-01", "NFL", BetResult::Won),
        ];

        let only_from = FilterSpec {
            from: "2023-01-01".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_bets(&bets, &only_from, NOW)), vec!["new"]);

        let only_to = FilterSpec {
            to: "2023-01-01".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_bets(&bets, &only_to, NOW)), vec!["old"]);
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let bets = vec![
            bet("garbage", "sometime", "NFL", BetResult::Won),
            bet("dated", "2024-06-01", "NFL", BetResult::Won),
        ];

        // "now" is 2025-01-01, so the undated bet sorts first
        let rows = filter_bets(&bets, &FilterSpec::default(), NOW);
        assert_eq!(ids(&rows), vec!["garbage", "dated"]);

        let range = FilterSpec {
            from: "2024-12-31".to_string(),
            to: "2025-01-01".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_bets(&bets, &range, NOW)), vec!["garbage"]);
    }

    #[test]
    fn test_query_searches_descriptive_fields() {
        let mut a = bet("a", "2024-01-01", "NBA", BetResult::Won);
        a.event = "Lakers @ Celtics".to_string();
        let mut b = bet("b", "2024-01-02", "NFL", BetResult::Won);
        b.notes = "live bet, CELTICS fan tax".to_string();
        let mut c = bet("c", "2024-01-03", "MLB", BetResult::Won);
        c.book = "Book C".to_string();
        let bets = vec![a, b, c];

        let filter = FilterSpec {
            query: "  celtics ".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_bets(&bets, &filter, NOW)), vec!["b", "a"]);

        let blank = FilterSpec {
            query: "   ".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(filter_bets(&bets, &blank, NOW).len(), 3);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let bets = vec![
            bet("a", "2024-01-01", "NFL", BetResult::Won),
            bet("b", "2024-01-02", "NFL", BetResult::Lost),
            bet("c", "2024-01-03", "NBA", BetResult::Won),
        ];
        let filter = FilterSpec {
            result: ResultFilter::Only(BetResult::Won),
            sport: SportFilter::Only("NFL".to_string()),
            ..FilterSpec::default()
        };

        assert_eq!(ids(&filter_bets(&bets, &filter, NOW)), vec!["a"]);
    }

    #[test]
    fn test_result_filter_from_str() {
        assert_eq!("All".parse::<ResultFilter>(), Ok(ResultFilter::All));
        assert_eq!(
            "lost".parse::<ResultFilter>(),
            Ok(ResultFilter::Only(BetResult::Lost))
        );
        assert!("maybe".parse::<ResultFilter>().is_err());
    }
}
