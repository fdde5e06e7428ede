//! Settlement calculator: per-bet profit, payout and odds math

pub mod odds;
pub mod settlement;

// Re-export commonly used types
pub use odds::{american_to_decimal, decimal_to_american, display_odds, format_american};
pub use settlement::{
    american_profit, decimal_profit, implied_prob, payout_if_win, profit_for_bet, profit_if_won,
    settle, to_number, Settlement,
};
