//! Transaction data model produced by every extractor.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RowError};

/// Descriptions are cut to this many characters before storage.
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Whether a transaction increases or decreases the owner's balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money in.
    Credit,
    /// Money out.
    #[default]
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Ok(Direction::Credit),
            "debit" => Ok(Direction::Debit),
            other => Err(RecordError::UnknownDirection(other.to_string())),
        }
    }
}

/// Spending category.
///
/// The heuristic classifier only ever produces the named variants; `Custom`
/// carries a category read verbatim from a source document or manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Income,
    Other,
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Income => "Income",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Food" => Category::Food,
            "Transport" => Category::Transport,
            "Shopping" => Category::Shopping,
            "Entertainment" => Category::Entertainment,
            "Income" => Category::Income,
            "Other" => Category::Other,
            _ => Category::Custom(name),
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Category::from(name.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

/// A normalized, immutable transaction fact.
///
/// Construct through [`TransactionRecord::new`]; fields are read-only from
/// outside the crate so the amount and description invariants always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    owner_id: String,
    date: String,
    description: String,
    amount: Decimal,
    category: Category,
    direction: Direction,
    created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Validating factory.
    ///
    /// Rejects an empty owner, a zero amount, and a negative amount. The
    /// description is truncated to [`MAX_DESCRIPTION_LEN`] characters and
    /// `created_at` is stamped with the current time.
    pub fn new(
        owner_id: impl Into<String>,
        date: impl Into<String>,
        description: impl AsRef<str>,
        amount: Decimal,
        category: Category,
        direction: Direction,
    ) -> Result<Self, RecordError> {
        let owner_id = owner_id.into();
        if owner_id.trim().is_empty() {
            return Err(RecordError::MissingOwner);
        }
        if amount.is_zero() {
            return Err(RecordError::ZeroAmount);
        }
        if amount.is_sign_negative() {
            return Err(RecordError::NegativeAmount(amount.to_string()));
        }

        Ok(Self {
            owner_id,
            date: date.into(),
            description: truncate_description(description.as_ref()),
            amount,
            category,
            direction,
            created_at: Utc::now(),
        })
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Today's date in the local timezone, the fallback for unrecoverable dates.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Cut a description to at most [`MAX_DESCRIPTION_LEN`] characters.
pub fn truncate_description(text: &str) -> String {
    text.chars().take(MAX_DESCRIPTION_LEN).collect()
}

/// Records and per-row errors produced by one extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Accepted candidate records, in source order.
    pub records: Vec<TransactionRecord>,
    /// One message per row or section that failed.
    pub errors: Vec<String>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result carrying a single error and no records.
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            records: Vec::new(),
            errors: vec![error.to_string()],
        }
    }

    /// Partition per-row outcomes into accepted records and error messages.
    ///
    /// `Ok(None)` is a row that was skipped on purpose (e.g. zero amount) and
    /// contributes to neither side.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Result<Option<TransactionRecord>, RowError>>,
    {
        let mut result = Self::new();
        for row in rows {
            result.push_row(row);
        }
        result
    }

    pub fn push_row(&mut self, row: Result<Option<TransactionRecord>, RowError>) {
        match row {
            Ok(Some(record)) => self.records.push(record),
            Ok(None) => {}
            Err(e) => self.errors.push(e.to_string()),
        }
    }

    pub fn push_error(&mut self, error: impl fmt::Display) {
        self.errors.push(error.to_string());
    }

    /// Append another result, keeping order.
    pub fn merge(&mut self, other: ExtractionResult) {
        self.records.extend(other.records);
        self.errors.extend(other.errors);
    }
}

/// A single transaction typed in by hand rather than extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualEntry {
    pub owner_id: String,
    /// Amount as typed; only digits and `.` are kept.
    pub amount: String,
    pub category: String,
    pub direction: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ManualEntry {
    /// Convert into a stored record.
    pub fn into_record(self) -> Result<TransactionRecord, RecordError> {
        let cleaned: String = self
            .amount
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let amount = Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO);
        let direction = self.direction.parse::<Direction>()?;
        let date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(today);

        TransactionRecord::new(
            self.owner_id,
            date,
            self.description.unwrap_or_default(),
            amount,
            Category::from(self.category.trim()),
            direction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_factory_rejects_zero_and_negative() {
        let zero = TransactionRecord::new("u1", "2026-01-01", "x", Decimal::ZERO, Category::Other, Direction::Debit);
        assert_eq!(zero.unwrap_err(), RecordError::ZeroAmount);

        let negative = TransactionRecord::new("u1", "2026-01-01", "x", dec("-5"), Category::Other, Direction::Debit);
        assert!(matches!(negative, Err(RecordError::NegativeAmount(_))));

        let no_owner = TransactionRecord::new(" ", "2026-01-01", "x", dec("5"), Category::Other, Direction::Debit);
        assert_eq!(no_owner.unwrap_err(), RecordError::MissingOwner);
    }

    #[test]
    fn test_description_truncated() {
        let long = "a".repeat(250);
        let record = TransactionRecord::new("u1", "2026-01-01", &long, dec("1"), Category::Other, Direction::Debit).unwrap();
        assert_eq!(record.description().chars().count(), MAX_DESCRIPTION_LEN);
    }

    #[test]
    fn test_category_serde_roundtrip_names() {
        let json = serde_json::to_string(&Category::Food).unwrap();
        assert_eq!(json, "\"Food\"");

        let custom: Category = serde_json::from_str("\"Utilities\"").unwrap();
        assert_eq!(custom, Category::Custom("Utilities".to_string()));
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Credit).unwrap(), "\"credit\"");
        assert_eq!("DEBIT".parse::<Direction>().unwrap(), Direction::Debit);
        assert_eq!(Direction::default(), Direction::Debit);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_from_rows_partitions() {
        let ok = TransactionRecord::new("u1", "d", "a", dec("1"), Category::Other, Direction::Debit).unwrap();
        let result = ExtractionResult::from_rows(vec![
            Ok(Some(ok)),
            Ok(None),
            Err(RowError::new(2, "bad cell")),
        ]);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.errors, vec!["row 2: bad cell".to_string()]);
    }

    #[test]
    fn test_manual_entry() {
        let entry = ManualEntry {
            owner_id: "u1".to_string(),
            amount: "₹1,250.75".to_string(),
            category: "Food".to_string(),
            direction: "Debit".to_string(),
            date: None,
            description: Some("Lunch".to_string()),
        };

        let record = entry.into_record().unwrap();
        assert_eq!(record.amount(), dec("1250.75"));
        assert_eq!(record.category(), &Category::Food);
        assert_eq!(record.date(), today());
    }

    #[test]
    fn test_manual_entry_empty_amount_rejected() {
        let entry = ManualEntry {
            owner_id: "u1".to_string(),
            amount: "abc".to_string(),
            category: "Food".to_string(),
            direction: "debit".to_string(),
            ..Default::default()
        };

        assert_eq!(entry.into_record().unwrap_err(), RecordError::ZeroAmount);
    }
}
