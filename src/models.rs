use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Odds convention a bet was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OddsType {
    #[default]
    American,
    Decimal,
}

impl OddsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OddsType::American => "American",
            OddsType::Decimal => "Decimal",
        }
    }
}

impl fmt::Display for OddsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OddsType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "american" | "us" => Ok(OddsType::American),
            "decimal" | "eu" => Ok(OddsType::Decimal),
            other => Err(format!("unknown odds type '{}'", other)),
        }
    }
}

/// Settlement status of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BetResult {
    #[default]
    Pending,
    Won,
    Lost,
    Push,
    Void,
}

impl BetResult {
    pub const ALL: [BetResult; 5] = [
        BetResult::Pending,
        BetResult::Won,
        BetResult::Lost,
        BetResult::Push,
        BetResult::Void,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BetResult::Pending => "Pending",
            BetResult::Won => "Won",
            BetResult::Lost => "Lost",
            BetResult::Push => "Push",
            BetResult::Void => "Void",
        }
    }
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BetResult::ALL
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("unknown result '{}'", wanted))
    }
}

/// Sports offered by the entry form. The field itself is free text.
pub const SPORT_PRESETS: [&str; 11] = [
    "NFL", "NBA", "MLB", "NHL", "NCAAF", "NCAAB", "Soccer", "Tennis", "Golf", "MMA", "Other",
];

/// One wagered event, in the shape it is persisted and exchanged.
///
/// `odds` and `stake` stay as text so half-typed entries survive a round trip;
/// arithmetic always goes through [`crate::core::to_number`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub book: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sport: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub event: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub market: String,
    #[serde(default)]
    pub odds_type: OddsType,
    #[serde(default, deserialize_with = "lenient_text")]
    pub odds: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stake: String,
    #[serde(default)]
    pub result: BetResult,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: String,
}

impl Bet {
    /// Calendar date of the bet, `None` when the text does not parse
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// Milliseconds since the epoch for the bet date, `None` when unparseable
    pub fn timestamp_ms(&self) -> Option<i64> {
        parse_date_ms(&self.date)
    }
}

/// Bet fields supplied by the entry form; the store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBet {
    pub date: String,
    pub book: String,
    pub sport: String,
    pub event: String,
    pub market: String,
    pub odds_type: OddsType,
    pub odds: String,
    pub stake: String,
    pub result: BetResult,
    pub notes: String,
}

impl Default for NewBet {
    fn default() -> Self {
        Self {
            date: today(),
            book: String::new(),
            sport: String::new(),
            event: String::new(),
            market: String::new(),
            odds_type: OddsType::American,
            odds: String::new(),
            stake: String::new(),
            result: BetResult::Pending,
            notes: String::new(),
        }
    }
}

impl NewBet {
    pub fn into_bet(self, id: String) -> Bet {
        Bet {
            id,
            date: self.date.trim().to_string(),
            book: self.book.trim().to_string(),
            sport: self.sport.trim().to_string(),
            event: self.event.trim().to_string(),
            market: self.market.trim().to_string(),
            odds_type: self.odds_type,
            odds: self.odds.trim().to_string(),
            stake: self.stake.trim().to_string(),
            result: self.result,
            notes: self.notes.trim().to_string(),
        }
    }
}

/// Partial update of a stored bet; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetPatch {
    pub date: Option<String>,
    pub book: Option<String>,
    pub sport: Option<String>,
    pub event: Option<String>,
    pub market: Option<String>,
    pub odds_type: Option<OddsType>,
    pub odds: Option<String>,
    pub stake: Option<String>,
    pub result: Option<BetResult>,
    pub notes: Option<String>,
}

impl BetPatch {
    pub fn is_empty(&self) -> bool {
        *self == BetPatch::default()
    }

    /// Apply to `bet`. The id is never touched.
    pub fn apply(&self, bet: &mut Bet) {
        fn set(field: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *field = v.trim().to_string();
            }
        }

        set(&mut bet.date, &self.date);
        set(&mut bet.book, &self.book);
        set(&mut bet.sport, &self.sport);
        set(&mut bet.event, &self.event);
        set(&mut bet.market, &self.market);
        set(&mut bet.odds, &self.odds);
        set(&mut bet.stake, &self.stake);
        set(&mut bet.notes, &self.notes);
        if let Some(odds_type) = self.odds_type {
            bet.odds_type = odds_type;
        }
        if let Some(result) = self.result {
            bet.result = result;
        }
    }
}

/// Today's date (UTC) as `YYYY-MM-DD`
pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Epoch milliseconds for a date text. Plain dates resolve to UTC midnight,
/// full timestamps keep their instant.
pub fn parse_date_ms(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Accepts a string, a number or null and keeps it as text
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(s)) => s,
        Some(TextOrNumber::Int(n)) => n.to_string(),
        Some(TextOrNumber::Float(n)) => n.to_string(),
        Some(TextOrNumber::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_serializes_camel_case_fields() {
        let bet = NewBet {
            date: "2024-03-01".to_string(),
            odds: "-110".to_string(),
            stake: "25".to_string(),
            ..NewBet::default()
        }
        .into_bet("abc".to_string());

        let json = serde_json::to_value(&bet).unwrap();
        assert_eq!(json["oddsType"], "American");
        assert_eq!(json["result"], "Pending");
        assert_eq!(json["odds"], "-110");
        assert!(json.get("odds_type").is_none());
    }

    #[test]
    fn test_bet_deserializes_numbers_and_nulls_as_text() {
        let json = r#"{
            "id": "x1",
            "date": "2024-01-15",
            "book": null,
            "oddsType": "Decimal",
            "odds": 1.8,
            "stake": 50,
            "result": "Won"
        }"#;

        let bet: Bet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.odds, "1.8");
        assert_eq!(bet.stake, "50");
        assert_eq!(bet.book, "");
        assert_eq!(bet.notes, "");
        assert_eq!(bet.odds_type, OddsType::Decimal);
        assert_eq!(bet.result, BetResult::Won);
    }

    #[test]
    fn test_bet_rejects_unknown_result() {
        let json = r#"{"id": "x1", "result": "Cashed"}"#;
        assert!(serde_json::from_str::<Bet>(json).is_err());
    }

    #[test]
    fn test_result_from_str() {
        assert_eq!("won".parse::<BetResult>(), Ok(BetResult::Won));
        assert_eq!(" Void ".parse::<BetResult>(), Ok(BetResult::Void));
        assert!("All".parse::<BetResult>().is_err());
    }

    #[test]
    fn test_odds_type_from_str() {
        assert_eq!("Decimal".parse::<OddsType>(), Ok(OddsType::Decimal));
        assert_eq!("american".parse::<OddsType>(), Ok(OddsType::American));
        assert!("fractional".parse::<OddsType>().is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-15"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(
            parse_date("2024-01-15T18:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("15/01/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_date_ms_is_utc_midnight() {
        assert_eq!(parse_date_ms("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_date_ms("not a date"), None);
    }

    #[test]
    fn test_patch_keeps_id_and_untouched_fields() {
        let mut bet = NewBet {
            book: "Book A".to_string(),
            stake: "10".to_string(),
            ..NewBet::default()
        }
        .into_bet("keep-me".to_string());

        let patch = BetPatch {
            result: Some(BetResult::Won),
            stake: Some(" 20 ".to_string()),
            ..BetPatch::default()
        };
        patch.apply(&mut bet);

        assert_eq!(bet.id, "keep-me");
        assert_eq!(bet.book, "Book A");
        assert_eq!(bet.stake, "20");
        assert_eq!(bet.result, BetResult::Won);
        assert!(BetPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_into_bet_trims_every_text_field() {
        let bet = NewBet {
            date: " 2024-02-10 ".to_string(),
            book: " Book A ".to_string(),
            sport: " NBA ".to_string(),
            odds: " +120 ".to_string(),
            ..NewBet::default()
        }
        .into_bet("t1".to_string());

        assert_eq!(bet.date, "2024-02-10");
        assert_eq!(bet.sport, "NBA");
        assert_eq!(bet.book, "Book A");
        assert_eq!(bet.odds, "+120");
    }

    #[test]
    fn test_parsed_date() {
        let mut bet = NewBet {
            date: "2024-02-29".to_string(),
            ..NewBet::default()
        }
        .into_bet("d1".to_string());
        assert_eq!(bet.parsed_date(), NaiveDate::from_ymd_opt(2024, 2, 29));

        bet.date = "2024-02-30".to_string();
        assert_eq!(bet.parsed_date(), None);
        assert_eq!(bet.timestamp_ms(), None);
    }
}
