//! Extracts candidate transactions from unstructured text, one line at a time.
//!
//! Used for PDF text layers and OCR output. A line becomes a transaction only
//! when it carries both a date-shaped and an amount-shaped token.

use std::ops::Range;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::error::RowError;
use crate::models::{Category, Direction, ExtractionResult, TransactionRecord};
use crate::rules::patterns::{AMOUNT_PATTERN, DATE_PATTERN, DESCRIPTION_TRIM, LINE_DIRECTION_HINTS};
use crate::rules::{classify, normalize};

/// The fields recovered from one line, before a record is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// First date match, verbatim.
    pub date: String,
    /// Line with every date and amount removed, separators trimmed.
    pub description: String,
    /// Normalized first amount, sign included.
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Category,
}

/// Line-oriented transaction parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextBlobParser;

impl TextBlobParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse every non-blank line of `text` into records owned by `owner_id`.
    ///
    /// Lines without a date and an amount are skipped silently, as are lines
    /// whose amount normalizes to zero.
    pub fn parse(&self, text: &str, owner_id: &str) -> ExtractionResult {
        debug!("Parsing text blob ({} chars)", text.len());

        let result = ExtractionResult::from_rows(
            text.lines()
                .map(str::trim)
                .enumerate()
                .filter(|(_, line)| !line.is_empty())
                .map(|(idx, line)| self.record_for_line(idx, line, owner_id)),
        );

        debug!(
            "Text blob produced {} records, {} errors",
            result.records.len(),
            result.errors.len()
        );
        result
    }

    fn record_for_line(
        &self,
        idx: usize,
        line: &str,
        owner_id: &str,
    ) -> Result<Option<TransactionRecord>, RowError> {
        let Some(parsed) = self.parse_line(line) else {
            return Ok(None);
        };

        let magnitude = parsed.amount.abs();
        if magnitude.is_zero() {
            trace!("Skipping zero-amount line {}: {}", idx, line);
            return Ok(None);
        }

        TransactionRecord::new(
            owner_id,
            parsed.date,
            parsed.description,
            magnitude,
            parsed.category,
            parsed.direction,
        )
        .map(Some)
        .map_err(|e| RowError::new(idx, e.to_string()))
    }

    /// Recover date, amount, description, direction and category from a
    /// single line, or `None` if it has no date/amount pair.
    pub fn parse_line(&self, line: &str) -> Option<ParsedLine> {
        let dates: Vec<Range<usize>> = DATE_PATTERN.find_iter(line).map(|m| m.range()).collect();
        let first_date = dates.first()?.clone();

        // Blank out dates so their digits are not read as amounts. Dates are
        // ASCII, so byte offsets stay aligned with the original line.
        let mut masked = line.to_string();
        for range in &dates {
            masked.replace_range(range.clone(), &" ".repeat(range.len()));
        }

        let amounts: Vec<Range<usize>> = AMOUNT_PATTERN.find_iter(&masked).map(|m| m.range()).collect();
        let first_amount = amounts.first()?.clone();

        let amount = normalize(&masked[first_amount]);
        let description = strip_ranges(line, dates.iter().chain(amounts.iter()));
        let description = description
            .trim_matches(|c: char| c.is_whitespace() || DESCRIPTION_TRIM.contains(&c))
            .to_string();

        let direction = if amount.is_sign_negative() {
            Direction::Debit
        } else {
            line_direction(line).unwrap_or(Direction::Debit)
        };

        Some(ParsedLine {
            date: line[first_date].to_string(),
            description,
            amount,
            direction,
            category: classify(line),
        })
    }
}

/// Direction implied by keywords in the line, if any.
fn line_direction(line: &str) -> Option<Direction> {
    let lower = line.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    LINE_DIRECTION_HINTS
        .iter()
        .find(|hint| {
            hint.substrings.iter().any(|s| lower.contains(s))
                || hint.words.iter().any(|w| words.contains(w))
        })
        .map(|hint| hint.direction)
}

fn strip_ranges<'a>(line: &str, ranges: impl Iterator<Item = &'a Range<usize>>) -> String {
    let ranges: Vec<&Range<usize>> = ranges.collect();
    line.char_indices()
        .filter(|(i, _)| !ranges.iter().any(|r| r.contains(i)))
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_negative_amount_line() {
        let result = TextBlobParser::new().parse("2026-01-15 Swiggy dinner -450.00", "u1");

        assert_eq!(result.records.len(), 1);
        assert!(result.errors.is_empty());

        let record = &result.records[0];
        assert_eq!(record.date(), "2026-01-15");
        assert_eq!(record.amount(), dec("450.00"));
        assert_eq!(record.direction(), Direction::Debit);
        assert_eq!(record.category(), &Category::Food);
        assert!(record.description().contains("Swiggy dinner"));
        assert_eq!(record.owner_id(), "u1");
    }

    #[test]
    fn test_credit_keywords() {
        let parser = TextBlobParser::new();

        let salary = parser.parse_line("01/02/2026 | ACME SALARY | 50,000.00").unwrap();
        assert_eq!(salary.direction, Direction::Credit);
        assert_eq!(salary.amount, dec("50000.00"));
        assert_eq!(salary.description, "ACME SALARY");

        let cr = parser.parse_line("03/02/2026 NEFT transfer 1,200 CR").unwrap();
        assert_eq!(cr.direction, Direction::Credit);

        // "cr" inside a word is not a credit marker.
        let scr = parser.parse_line("03/02/2026 scrap metal 300").unwrap();
        assert_eq!(scr.direction, Direction::Debit);
    }

    #[test]
    fn test_debit_keywords_and_default() {
        let parser = TextBlobParser::new();

        let dr = parser.parse_line("2026-02-04 ATM withdrawal 2000 Dr").unwrap();
        assert_eq!(dr.direction, Direction::Debit);

        let plain = parser.parse_line("2026-02-05 Groceries 845.20").unwrap();
        assert_eq!(plain.direction, Direction::Debit);
        assert_eq!(plain.category, Category::Other);
    }

    #[test]
    fn test_first_amount_wins() {
        let line = parser_line("2026-02-06 Uber 120.00 balance 9,880.00");
        assert_eq!(line.amount, dec("120.00"));
        assert_eq!(line.category, Category::Transport);
        assert_eq!(line.description, "Uber balance");
    }

    fn parser_line(line: &str) -> ParsedLine {
        TextBlobParser::new().parse_line(line).unwrap()
    }

    #[test]
    fn test_lines_without_pairs_skipped() {
        let text = "STATEMENT OF ACCOUNT\n\nOpening balance 10,000.00\n2026-01-01\n2026-01-02 Zomato 250";
        let result = TextBlobParser::new().parse(text, "u1");

        assert_eq!(result.records.len(), 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.records[0].description(), "Zomato");
    }

    #[test]
    fn test_zero_amount_dropped() {
        let result = TextBlobParser::new().parse("2026-01-03 Reversal 0.00", "u1");
        assert!(result.records.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_currency_glyph_trimmed() {
        let line = parser_line("₹ Netflix: 2026-03-01 ₹649");
        assert_eq!(line.amount, dec("649"));
        assert_eq!(line.description, "Netflix");
        assert_eq!(line.category, Category::Entertainment);
    }

    #[test]
    fn test_amounts_never_negative() {
        let text = "2026-01-01 a -10\n2026-01-02 b +20\n2026-01-03 c -0.5 credit\n2026-01-04 d 7 dr";
        let result = TextBlobParser::new().parse(text, "u1");

        assert_eq!(result.records.len(), 4);
        for record in &result.records {
            assert!(record.amount() > Decimal::ZERO);
        }
        assert_eq!(result.records[2].direction(), Direction::Debit);
    }
}
