//! Row-like element extraction from an HTML document.
//!
//! Table rows are preferred. Pages without any `<tr>` fall back to ARIA rows
//! (`role="row"`), which is how most script-rendered grids mark up their data.

use scraper::{ElementRef, Html, Selector};

use crate::common::{CellValue, RawRow};

const TABLE_ROW: &str = "tr";
const TABLE_CELL: &str = "td, th";
const BLOCK_ROW: &str = "[role='row']";
const BLOCK_CELL: &str =
    "[role='cell'], [role='gridcell'], [role='columnheader'], [role='rowheader']";

/// One row-like element and its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub tag: String,
    pub html: String,
    pub text: String,
    pub cells: Vec<String>,
}

impl ParsedRow {
    /// Positional columns only: `column_0`, `column_1`, ...
    pub fn into_positional_row(self) -> RawRow {
        let mut row = RawRow::new();
        for (i, cell) in self.cells.into_iter().enumerate() {
            row.insert(format!("column_{}", i), CellValue::Text(cell));
        }
        row
    }
}

/// Extract every row-like element that has at least one cell.
pub fn parse_rows(html: &str) -> Vec<ParsedRow> {
    let document = Html::parse_document(html);

    let rows = select_rows(&document, TABLE_ROW, TABLE_CELL);
    if !rows.is_empty() {
        return rows;
    }

    select_rows(&document, BLOCK_ROW, BLOCK_CELL)
}

/// Whether the document contains at least one element matching `selector`.
pub fn has_container(html: &str, selector: &str) -> bool {
    let Ok(selector) = Selector::parse(selector) else {
        return false;
    };
    Html::parse_document(html).select(&selector).next().is_some()
}

fn select_rows(document: &Html, row_selector: &str, cell_selector: &str) -> Vec<ParsedRow> {
    let (Ok(rows), Ok(cells)) = (Selector::parse(row_selector), Selector::parse(cell_selector))
    else {
        return vec![];
    };

    document
        .select(&rows)
        .filter_map(|element| {
            let cells: Vec<String> = element.select(&cells).map(element_text).collect();
            if cells.is_empty() {
                return None;
            }
            Some(ParsedRow {
                tag: element.value().name().to_string(),
                html: element.html(),
                text: element_text(element),
                cells,
            })
        })
        .collect()
}

/// Visible text with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
