//! JSON import/export of the bet collection
//!
//! The exchanged document is a top-level array of flat bet objects with the
//! fields `id, date, book, sport, event, market, oddsType, odds, stake,
//! result, notes`.

use serde_json::Value;
use tracing::{debug, info};

use super::store::{ensure_unique_ids, LedgerStore};
use crate::error::LedgerError;
use crate::models::Bet;

/// Parse an import document into bets
///
/// The whole payload is rejected if the top level is not an array or any
/// record fails to parse; nothing is partially accepted. Records without an
/// id, or repeating an id seen earlier in the payload, get a fresh one.
pub fn parse_import(json: &str) -> Result<Vec<Bet>, LedgerError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| LedgerError::InvalidFile(format!("not valid JSON: {}", e)))?;

    let records = match value {
        Value::Array(records) => records,
        other => {
            return Err(LedgerError::InvalidFile(format!(
                "expected an array of bets, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut bets = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            return Err(LedgerError::InvalidRecord {
                index,
                reason: format!("expected an object, found {}", json_kind(&record)),
            });
        }

        let bet: Bet = serde_json::from_value(record).map_err(|e| LedgerError::InvalidRecord {
            index,
            reason: e.to_string(),
        })?;
        bets.push(bet);
    }

    let reassigned = ensure_unique_ids(&mut bets);
    debug!(count = bets.len(), reassigned, "Parsed import");
    Ok(bets)
}

/// Serialize bets as a pretty-printed JSON array
pub fn export_json(bets: &[Bet]) -> Result<String, LedgerError> {
    Ok(serde_json::to_string_pretty(bets)?)
}

/// Replace the store contents with an import document
///
/// On any error the store is left exactly as it was.
pub fn import_into(store: &mut LedgerStore, json: &str) -> Result<usize, LedgerError> {
    let bets = parse_import(json)?;
    let count = bets.len();
    store.replace_all(bets)?;

    info!(count, "Imported bets");
    Ok(count)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
