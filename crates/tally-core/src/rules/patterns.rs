//! Regex patterns and keyword tables used by the line parser and extractors.
//!
//! Keyword tables are ordered; callers test them top to bottom and stop at
//! the first hit.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Category, Direction};

lazy_static! {
    /// 1-4 digits, `-` or `/`, 1-2 digits, separator, 1-4 digits.
    pub static ref DATE_PATTERN: Regex = Regex::new(
        r"\d{1,4}[-/]\d{1,2}[-/]\d{1,4}"
    ).unwrap();

    /// Optional sign, optional currency glyph, digit groups, optional decimals.
    pub static ref AMOUNT_PATTERN: Regex = Regex::new(
        r"[+-]?\s*[₹$€£]?\s*\d[\d,]*\.?\d*"
    ).unwrap();
}

/// Characters trimmed from both ends of a line-derived description.
pub const DESCRIPTION_TRIM: &[char] = &['-', '|', ':', '₹', '$', '€', '£'];

/// Category keyword sets, matched as lower-case substrings, first match wins.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Food, &["swiggy", "zomato", "food", "restaurant", "eat"]),
    (Category::Transport, &["uber", "ola", "travel", "flight", "petrol", "fuel"]),
    (Category::Shopping, &["amazon", "flipkart", "shopping", "myntra"]),
    (Category::Entertainment, &["netflix", "hotstar", "movie", "spotify"]),
];

/// Description words that turn an unclassified credit into income.
pub const INCOME_KEYWORDS: &[&str] = &["salary", "interest", "refund"];

/// Direction hints in free text. Substrings are matched anywhere in the
/// lower-cased line, words only as whitespace-separated tokens.
pub struct DirectionHint {
    pub direction: Direction,
    pub substrings: &'static [&'static str],
    pub words: &'static [&'static str],
}

pub const LINE_DIRECTION_HINTS: &[DirectionHint] = &[
    DirectionHint {
        direction: Direction::Credit,
        substrings: &["credit", "income", "salary"],
        words: &["cr"],
    },
    DirectionHint {
        direction: Direction::Debit,
        substrings: &["debit", "expense"],
        words: &["dr"],
    },
];

/// Exact values of a type/direction column.
pub const TYPE_COLUMN_VALUES: &[(Direction, &[&str])] = &[
    (Direction::Credit, &["credit", "cr", "income", "deposit"]),
    (Direction::Debit, &["debit", "dr", "withdrawal"]),
];

/// Header substrings for each semantic column role.
pub const DATE_HEADERS: &[&str] = &["date", "time"];
pub const DESCRIPTION_HEADERS: &[&str] = &["desc", "detail", "particular", "narr", "remark"];
pub const AMOUNT_HEADERS: &[&str] = &["amt", "amount", "value", "debit", "credit"];
pub const CATEGORY_HEADERS: &[&str] = &["cat"];
pub const TYPE_HEADERS: &[&str] = &["type", "dr/cr"];

/// Separate debit/credit columns: substrings first, then whole header words.
pub const DEBIT_HEADERS: &[&str] = &["debit", "withdraw"];
pub const DEBIT_HEADER_WORDS: &[&str] = &["dr"];
pub const CREDIT_HEADERS: &[&str] = &["credit", "deposit"];
pub const CREDIT_HEADER_WORDS: &[&str] = &["cr"];

/// Placeholder for rows without a description.
pub const DEFAULT_DESCRIPTION: &str = "Bulk Import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_pattern() {
        assert!(DATE_PATTERN.is_match("2026-01-15"));
        assert!(DATE_PATTERN.is_match("15/1/26"));
        assert!(!DATE_PATTERN.is_match("2026.01.15"));
    }

    #[test]
    fn test_amount_pattern_requires_digit() {
        assert!(!AMOUNT_PATTERN.is_match("Swiggy, dinner"));
        let m = AMOUNT_PATTERN.find("paid ₹ 1,234.50 today").unwrap();
        assert_eq!(m.as_str().trim(), "₹ 1,234.50");
    }
}
