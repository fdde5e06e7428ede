//! Betledger - personal wager ledger
//!
//! This library provides:
//! - Bet settlement under American and decimal odds (profit, payout, implied probability)
//! - Odds convention conversion for display
//! - Filtering, summary statistics and a cumulative P&L curve over a bet collection
//! - JSON file persistence and import/export of the collection
//!
//! # Example
//!
//! ```
//! use betledger::ledger::{aggregate, FilterSpec};
//! use betledger::models::{BetResult, NewBet, OddsType};
//!
//! let bet = NewBet {
//!     date: "2024-01-15".to_string(),
//!     odds_type: OddsType::American,
//!     odds: "+150".to_string(),
//!     stake: "100".to_string(),
//!     result: BetResult::Won,
//!     ..NewBet::default()
//! }
//! .into_bet("1".to_string());
//!
//! let report = aggregate(&[bet], &FilterSpec::default());
//! assert_eq!(report.stats.realized, 150.0);
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod ledger;
pub mod models;

// Re-export commonly used types
pub use config::LedgerConfig;
pub use crate::core::{settle, Settlement};
pub use data::LedgerStore;
pub use error::LedgerError;
pub use ledger::{aggregate, FilterSpec, LedgerReport};
pub use models::{Bet, BetPatch, BetResult, NewBet, OddsType};
