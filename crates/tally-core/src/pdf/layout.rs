//! Table-row detection on a page's text layer.
//!
//! Statement PDFs lay their transaction tables out as columns separated by
//! runs of spaces. Such a line is read as a table row and its cells are
//! joined with single spaces; every other line is free text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CELL_GAP: Regex = Regex::new(r"\t+|\s{2,}").unwrap();
}

/// Split a line into table cells, or `None` if it is not a table row.
pub fn split_table_row(line: &str) -> Option<Vec<String>> {
    let cells: Vec<String> = CELL_GAP
        .split(line.trim())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    (cells.len() >= 2).then_some(cells)
}

/// Normalize a page's text: table rows become single-spaced lines, blank
/// lines are dropped, free text is kept as is.
pub fn layout_page_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match split_table_row(line) {
            Some(cells) => out.push_str(&cells.join(" ")),
            None => out.push_str(line.trim()),
        }
        out.push('\n');
    }
    out
}
