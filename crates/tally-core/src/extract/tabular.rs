//! CSV and spreadsheet extraction.
//!
//! The payload is loaded into a header row plus data rows of [`Cell`]s,
//! column roles are inferred from header names, and every row is normalized
//! on its own so one bad row never aborts the rest.

use std::io::Cursor;

use calamine::{Data, Reader};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::Extractor;
use crate::error::{RowError, SchemaError, TabularError};
use crate::models::transaction::today;
use crate::models::{Category, Direction, ExtractionResult, TransactionRecord};
use crate::rules::patterns::{
    AMOUNT_HEADERS, CATEGORY_HEADERS, CREDIT_HEADERS, CREDIT_HEADER_WORDS, DATE_HEADERS,
    DEBIT_HEADERS, DEBIT_HEADER_WORDS, DEFAULT_DESCRIPTION, DESCRIPTION_HEADERS, TYPE_COLUMN_VALUES,
    TYPE_HEADERS,
};
use crate::rules::{classify_with_direction, normalize};

/// Container format of a tabular upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Xlsx,
    Xls,
}

impl TabularFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Xlsx => "xlsx",
            TabularFormat::Xls => "xls",
        }
    }
}

/// A single decoded cell, independent of the container it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    /// Spreadsheet date, already formatted as `YYYY-MM-DD`.
    Date(String),
    /// Spreadsheet error value such as `#DIV/0!`.
    Error(String),
}

impl Cell {
    fn text(&self) -> Option<String> {
        let text = match self {
            Cell::Empty | Cell::Error(_) => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Date(d) => d.clone(),
        };
        (!text.is_empty()).then_some(text)
    }

    fn amount(&self) -> Result<Decimal, String> {
        match self {
            Cell::Empty => Ok(Decimal::ZERO),
            Cell::Text(s) => Ok(normalize(s.as_str())),
            Cell::Int(i) => Ok(normalize(*i)),
            Cell::Float(f) => Ok(normalize(*f)),
            Cell::Date(d) => Err(format!("expected an amount, found date {}", d)),
            Cell::Error(e) => Err(format!("cell error {}", e)),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => Cell::Date(value.format("%Y-%m-%d").to_string()),
                None => Cell::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => Cell::Date(s.chars().take(10).collect()),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// A decoded table. A row is `Err` when the container could not decode it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Result<Vec<Cell>, String>>,
}

/// Where a row's amount comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountColumns {
    /// One signed amount column.
    Unified(usize),
    /// Separate withdrawal and deposit columns.
    Split {
        debit: Option<usize>,
        credit: Option<usize>,
    },
}

/// Column indices for each semantic role.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    date: Option<usize>,
    description: Option<usize>,
    category: Option<usize>,
    kind: Option<usize>,
    amount: AmountColumns,
}

impl ColumnMap {
    /// Infer roles from normalized (lower-cased, trimmed) header names.
    fn infer(headers: &[String]) -> Result<Self, SchemaError> {
        let kind = find_column(headers, TYPE_HEADERS, &[], None);
        let debit = find_column(headers, DEBIT_HEADERS, DEBIT_HEADER_WORDS, kind);
        let credit = find_column(headers, CREDIT_HEADERS, CREDIT_HEADER_WORDS, kind)
            .filter(|c| Some(*c) != debit);
        let unified = find_column(headers, AMOUNT_HEADERS, &[], kind);
        let date = find_column(headers, DATE_HEADERS, &[], None);

        // "debit", "credit" and "value date" also read as amount headers; a
        // candidate that is really one of those is not a unified column.
        let amount = match (debit, credit, unified) {
            (None, None, None) => return Err(SchemaError::NoAmountColumn),
            (Some(_), Some(_), Some(col)) if ![debit, credit, date].contains(&Some(col)) => {
                AmountColumns::Unified(col)
            }
            (Some(_), Some(_), _) => AmountColumns::Split { debit, credit },
            (_, _, Some(col)) => AmountColumns::Unified(col),
            _ => AmountColumns::Split { debit, credit },
        };

        Ok(Self {
            date,
            description: find_column(headers, DESCRIPTION_HEADERS, &[], None),
            category: find_column(headers, CATEGORY_HEADERS, &[], None),
            kind,
            amount,
        })
    }
}

/// First header containing one of `substrings`, or having one of `words` as
/// a whole word. `skip` excludes a column already claimed by another role.
fn find_column(headers: &[String], substrings: &[&str], words: &[&str], skip: Option<usize>) -> Option<usize> {
    headers.iter().enumerate().position(|(idx, header)| {
        if Some(idx) == skip {
            return false;
        }
        substrings.iter().any(|s| header.contains(s))
            || header
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| words.contains(&word))
    })
}

/// Extractor for CSV, XLSX and XLS uploads.
#[derive(Debug, Clone, Copy)]
pub struct TabularExtractor {
    format: TabularFormat,
}

impl TabularExtractor {
    pub fn new(format: TabularFormat) -> Self {
        Self { format }
    }

    fn load(&self, data: &[u8]) -> Result<Table, TabularError> {
        match self.format {
            TabularFormat::Csv => load_csv(data),
            TabularFormat::Xlsx => {
                let workbook = calamine::Xlsx::new(Cursor::new(data)).map_err(calamine::Error::from)?;
                load_workbook(workbook)
            }
            TabularFormat::Xls => {
                let workbook = calamine::Xls::new(Cursor::new(data)).map_err(calamine::Error::from)?;
                load_workbook(workbook)
            }
        }
    }

    pub(crate) fn extract_table(&self, table: &Table, owner_id: &str) -> ExtractionResult {
        if table.headers.is_empty() {
            return ExtractionResult::failed(SchemaError::NoHeader);
        }

        let columns = match ColumnMap::infer(&table.headers) {
            Ok(columns) => columns,
            Err(e) => {
                warn!("No amount column in headers {:?}", table.headers);
                return ExtractionResult::failed(e);
            }
        };
        debug!("Column roles: {:?}", columns);

        ExtractionResult::from_rows(table.rows.iter().enumerate().map(|(idx, row)| {
            let cells = row.as_ref().map_err(|e| RowError::new(idx, e.clone()))?;
            record_for_row(idx, cells, &columns, owner_id).inspect_err(|e| warn!("{}", e))
        }))
    }
}

impl Extractor for TabularExtractor {
    fn name(&self) -> &'static str {
        self.format.extension()
    }

    fn extract(&self, data: &[u8], owner_id: &str) -> ExtractionResult {
        let table = match self.load(data) {
            Ok(table) => table,
            Err(e) => {
                warn!("Could not decode {} upload: {}", self.format.extension(), e);
                return ExtractionResult::failed(format!("Failed to parse {}: {}", self.format.extension(), e));
            }
        };

        debug!("Loaded {} table: {} columns, {} rows", self.name(), table.headers.len(), table.rows.len());
        self.extract_table(&table, owner_id)
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn load_csv(data: &[u8]) -> Result<Table, TabularError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| {
                    r.iter()
                        .map(|field| {
                            if field.trim().is_empty() {
                                Cell::Empty
                            } else {
                                Cell::Text(field.to_string())
                            }
                        })
                        .collect()
                })
                .map_err(|e| e.to_string())
        })
        .collect();

    Ok(Table { headers, rows })
}

fn load_workbook<RS, R>(mut workbook: R) -> Result<Table, TabularError>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    calamine::Error: From<R::Error>,
{
    let first = workbook.sheet_names().into_iter().next().ok_or(TabularError::NoSheets)?;
    let range = workbook.worksheet_range(&first).map_err(calamine::Error::from)?;
    debug!("Reading sheet {}", first);

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| normalize_header(&Cell::from(cell).text().unwrap_or_default()))
            .collect(),
        None => Vec::new(),
    };
    let rows = rows.map(|row| Ok(row.iter().map(Cell::from).collect())).collect();

    Ok(Table { headers, rows })
}

fn record_for_row(
    idx: usize,
    cells: &[Cell],
    columns: &ColumnMap,
    owner_id: &str,
) -> Result<Option<TransactionRecord>, RowError> {
    let cell = |col: Option<usize>| col.and_then(|c| cells.get(c)).unwrap_or(&Cell::Empty);
    let amount_of = |col: Option<usize>| cell(col).amount().map_err(|e| RowError::new(idx, e));

    let (amount, direction) = match columns.amount {
        AmountColumns::Unified(col) => {
            let signed = amount_of(Some(col))?;
            // Unsigned rows without a recognized type are debits, as are
            // negative ones.
            let direction = cell(columns.kind)
                .text()
                .and_then(|t| type_direction(&t))
                .unwrap_or(Direction::Debit);
            (signed.abs(), direction)
        }
        AmountColumns::Split { debit, credit } => {
            let credit = amount_of(credit)?;
            let debit = amount_of(debit)?;
            // Only positive values count; anything else is skipped as zero.
            if credit > Decimal::ZERO {
                (credit, Direction::Credit)
            } else {
                (debit.max(Decimal::ZERO), Direction::Debit)
            }
        }
    };

    if amount.is_zero() {
        debug!("Skipping row {}: zero amount", idx);
        return Ok(None);
    }

    let date = cell(columns.date).text().unwrap_or_else(today);
    let description = cell(columns.description)
        .text()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let category = match cell(columns.category).text() {
        Some(explicit) => Category::from(explicit),
        None => classify_with_direction(&description, direction),
    };

    TransactionRecord::new(owner_id, date, description, amount, category, direction)
        .map(Some)
        .map_err(|e| RowError::new(idx, e.to_string()))
}

/// Map a type/direction column value to a direction by exact match.
fn type_direction(value: &str) -> Option<Direction> {
    let value = value.trim().to_lowercase();
    TYPE_COLUMN_VALUES
        .iter()
        .find(|(_, values)| values.contains(&value.as_str()))
        .map(|(direction, _)| *direction)
}
