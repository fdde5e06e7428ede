use thiserror::Error;

use crate::core::to_number;
use crate::models::{parse_date, Bet, BetPatch, NewBet, OddsType};

/// Ledger error types
///
/// The settlement and aggregation code never fails; these come from the
/// storage, import and entry-validation paths only.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Import payload is not a JSON array of records
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No bet with id '{0}'")]
    NotFound(String),
}

/// Validation functions
pub fn validate_date(date: &str) -> Result<(), LedgerError> {
    if parse_date(date).is_none() {
        return Err(LedgerError::Validation(format!(
            "Date must be YYYY-MM-DD, got '{}'",
            date
        )));
    }
    Ok(())
}

pub fn validate_stake(stake: &str) -> Result<(), LedgerError> {
    if to_number(stake) <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "Stake must be a positive number, got '{}'",
            stake
        )));
    }
    Ok(())
}

pub fn validate_odds(odds_type: OddsType, odds: &str) -> Result<(), LedgerError> {
    let value = to_number(odds);
    let valid = match odds_type {
        OddsType::American => value.abs() >= 100.0,
        OddsType::Decimal => value > 1.0,
    };

    if !valid {
        let expected = match odds_type {
            OddsType::American => "at least +100 or at most -100",
            OddsType::Decimal => "greater than 1.0",
        };
        return Err(LedgerError::Validation(format!(
            "{} odds must be {}, got '{}'",
            odds_type, expected, odds
        )));
    }
    Ok(())
}

/// Check an entry form before it reaches the store
pub fn validate_new_bet(bet: &NewBet) -> Result<(), LedgerError> {
    validate_date(&bet.date)?;
    validate_stake(&bet.stake)?;
    validate_odds(bet.odds_type, &bet.odds)?;
    Ok(())
}

/// Check an edit against the bet it applies to.
///
/// Only the fields the patch touches are checked; changing the odds type
/// re-checks the odds under the new convention.
pub fn validate_patch(bet: &Bet, patch: &BetPatch) -> Result<(), LedgerError> {
    let mut patched = bet.clone();
    patch.apply(&mut patched);

    if patch.date.is_some() {
        validate_date(&patched.date)?;
    }
    if patch.stake.is_some() {
        validate_stake(&patched.stake)?;
    }
    if patch.odds.is_some() || patch.odds_type.is_some() {
        validate_odds(patched.odds_type, &patched.odds)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-02-29").is_ok());
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_validate_stake() {
        assert!(validate_stake("25").is_ok());
        assert!(validate_stake("0.5").is_ok());
        assert!(validate_stake("0").is_err());
        assert!(validate_stake("-10").is_err());
        assert!(validate_stake("ten").is_err());
    }

    #[test]
    fn test_validate_odds_american() {
        assert!(validate_odds(OddsType::American, "-110").is_ok());
        assert!(validate_odds(OddsType::American, "+100").is_ok());
        assert!(validate_odds(OddsType::American, "50").is_err());
        assert!(validate_odds(OddsType::American, "").is_err());
    }

    #[test]
    fn test_validate_odds_decimal() {
        assert!(validate_odds(OddsType::Decimal, "1.01").is_ok());
        assert!(validate_odds(OddsType::Decimal, "1.0").is_err());
        assert!(validate_odds(OddsType::Decimal, "0.5").is_err());
    }

    #[test]
    fn test_validate_new_bet() {
        let bet = NewBet {
            date: "2024-05-01".to_string(),
            odds: "-120".to_string(),
            stake: "60".to_string(),
            ..NewBet::default()
        };
        assert!(validate_new_bet(&bet).is_ok());

        let bad = NewBet {
            stake: String::new(),
            ..bet
        };
        assert!(validate_new_bet(&bad).is_err());
    }

    #[test]
    fn test_validate_patch() {
        let bet = NewBet {
            date: "2024-05-01".to_string(),
            odds: "-120".to_string(),
            stake: "60".to_string(),
            ..NewBet::default()
        }
        .into_bet("p1".to_string());

        let bad_date = BetPatch {
            date: Some("garbage".to_string()),
            ..BetPatch::default()
        };
        assert!(matches!(
            validate_patch(&bet, &bad_date),
            Err(LedgerError::Validation(_))
        ));

        let bad_stake = BetPatch {
            stake: Some("0".to_string()),
            ..BetPatch::default()
        };
        assert!(validate_patch(&bet, &bad_stake).is_err());

        // -120 is not valid decimal odds
        let switch_type = BetPatch {
            odds_type: Some(OddsType::Decimal),
            ..BetPatch::default()
        };
        assert!(validate_patch(&bet, &switch_type).is_err());

        let settle = BetPatch {
            result: Some(crate::models::BetResult::Won),
            notes: Some("cashed".to_string()),
            ..BetPatch::default()
        };
        assert!(validate_patch(&bet, &settle).is_ok());
    }

    #[test]
    fn test_validate_patch_ignores_untouched_fields() {
        let mut bet = NewBet::default().into_bet("legacy".to_string());
        bet.stake = String::new();

        let patch = BetPatch {
            date: Some("2024-06-01".to_string()),
            ..BetPatch::default()
        };
        assert!(validate_patch(&bet, &patch).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Validation("test error".to_string());
        assert!(err.to_string().contains("Validation error"));

        let err = LedgerError::InvalidRecord {
            index: 3,
            reason: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid record at index 3: bad");
    }
}
