//! Raw rows to a rectangular, deduplicated table.

use std::collections::HashSet;

use crate::common::{parse_number, CellValue, NormalizedTable, RawRow};

/// What to do with cells that are still null after alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// Replace nulls with an empty string (generic/text pipelines)
    EmptyMarker,
    /// Leave nulls in place (typed pipelines)
    KeepNull,
}

/// Lower-case, trimmed, with runs of spaces, hyphens and underscores
/// collapsed to one `_`.
pub fn canonical_column_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for ch in raw.trim().chars() {
        if ch == ' ' || ch == '-' || ch == '_' || ch.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;
        out.extend(ch.to_lowercase());
    }

    out
}

/// Normalize heterogeneous rows into one table.
///
/// Columns are ordered by first appearance. Exact duplicate rows are dropped
/// (first occurrence wins). Text that parses as a finite number becomes a
/// number; anything else is kept as trimmed text.
pub fn normalize(rows: &[RawRow], policy: NullPolicy) -> NormalizedTable {
    if rows.is_empty() {
        return NormalizedTable::empty();
    }

    let canonical_rows: Vec<RawRow> = rows
        .iter()
        .map(|row| {
            let mut canonical = RawRow::new();
            for (column, value) in row.iter() {
                canonical.insert(canonical_column_name(column), value.clone());
            }
            canonical
        })
        .collect();

    let mut columns: Vec<String> = Vec::new();
    for row in &canonical_rows {
        for (column, _) in row.iter() {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    let mut table_rows = Vec::with_capacity(canonical_rows.len());

    for row in &canonical_rows {
        let aligned: Vec<CellValue> = columns
            .iter()
            .map(|column| row.get(column).cloned().unwrap_or(CellValue::Null))
            .collect();

        if !seen.insert(row_key(&aligned)) {
            continue;
        }

        table_rows.push(
            aligned
                .into_iter()
                .map(|cell| coerce(fill_null(cell, policy)))
                .collect(),
        );
    }

    NormalizedTable::new(columns, table_rows)
}

/// Identity of a row for duplicate detection. Variants are kept distinct.
fn row_key(cells: &[CellValue]) -> String {
    cells
        .iter()
        .map(|cell| match cell {
            CellValue::Null => "n:".to_string(),
            CellValue::Number(n) => format!("f:{}", n),
            CellValue::Text(s) => format!("t:{}:{}", s.len(), s),
        })
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

fn fill_null(cell: CellValue, policy: NullPolicy) -> CellValue {
    match (cell, policy) {
        (CellValue::Null, NullPolicy::EmptyMarker) => CellValue::Text(String::new()),
        (cell, _) => cell,
    }
}

fn coerce(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Text(text) => match parse_number(&text) {
            Some(n) => CellValue::Number(n),
            None => CellValue::Text(text.trim().to_string()),
        },
        other => other,
    }
}
