//! Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;

use crate::models::OddsType;

/// Default ledger file, named after the `bet-tracker:v1` storage key
pub const DEFAULT_LEDGER_FILE: &str = "bet-tracker-v1.json";

/// Ledger configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Path to the JSON ledger file
    pub ledger_path: PathBuf,
    /// Convention odds are displayed in
    pub odds_view: OddsType,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            odds_view: OddsType::American,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables (with defaults):
    /// - BETLEDGER_FILE: ledger path (default: bet-tracker-v1.json)
    /// - BETLEDGER_ODDS_VIEW: american or decimal (default: american)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ledger_path = lookup("BETLEDGER_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.ledger_path);

        let odds_view = lookup("BETLEDGER_ODDS_VIEW")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.odds_view);

        Self {
            ledger_path,
            odds_view,
        }
    }
}
