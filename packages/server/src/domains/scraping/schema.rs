//! Expected column schemas for the typed stat tables.
//!
//! A normalized table is projected onto a schema by canonical column name:
//! missing columns become NULL, unknown columns are dropped, and a cell that
//! cannot be represented in its column's type is stored as NULL.

use crate::common::{CellValue, NormalizedTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Int,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> ExpectedColumn {
    ExpectedColumn { name, kind: ColumnKind::Text }
}

const fn int(name: &'static str) -> ExpectedColumn {
    ExpectedColumn { name, kind: ColumnKind::Int }
}

const fn float(name: &'static str) -> ExpectedColumn {
    ExpectedColumn { name, kind: ColumnKind::Float }
}

/// Target table plus its ordered expected columns. `season` and
/// `is_demo_data` are set by the loader and not listed here.
#[derive(Debug, Clone, Copy)]
pub struct TargetSchema {
    pub table: &'static str,
    pub columns: &'static [ExpectedColumn],
}

pub static BASKETBALL_SCHEMA: TargetSchema = TargetSchema {
    table: "basketball_stats",
    columns: &[
        text("player_name"),
        text("team_name"),
        int("games_played"),
        float("points_per_game"),
        float("field_goal_percentage"),
        float("three_point_percentage"),
        float("free_throw_percentage"),
        float("rebounds_per_game"),
        float("assists_per_game"),
        float("steals_per_game"),
        float("blocks_per_game"),
        float("turnovers_per_game"),
        float("minutes_per_game"),
    ],
};

pub static FOOTBALL_SCHEMA: TargetSchema = TargetSchema {
    table: "football_stats",
    columns: &[
        text("player_name"),
        text("team_name"),
        text("position"),
        int("games_played"),
        int("passing_yards"),
        int("passing_touchdowns"),
        int("interceptions_thrown"),
        int("rushing_yards"),
        int("rushing_touchdowns"),
        int("receiving_yards"),
        int("receiving_touchdowns"),
        int("total_tackles"),
        float("sacks"),
        int("interceptions"),
        int("fumbles_recovered"),
    ],
};

/// A cell converted to its column type. `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(Option<String>),
    Int(Option<i32>),
    Float(Option<f64>),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            TypedValue::Text(None) | TypedValue::Int(None) | TypedValue::Float(None)
        )
    }

    fn convert(cell: Option<&CellValue>, kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => TypedValue::Text(cell.and_then(CellValue::as_text)),
            ColumnKind::Int => TypedValue::Int(
                cell.and_then(CellValue::as_i64)
                    .and_then(|n| i32::try_from(n).ok()),
            ),
            ColumnKind::Float => TypedValue::Float(cell.and_then(CellValue::as_f64)),
        }
    }
}

impl TargetSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// One typed row per table row, one value per expected column.
    pub fn project(&self, table: &NormalizedTable) -> Vec<Vec<TypedValue>> {
        let indices: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| table.column_index(c.name))
            .collect();

        table
            .rows()
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(&indices)
                    .map(|(column, index)| {
                        let cell = index.and_then(|i| row.get(i));
                        TypedValue::convert(cell, column.kind)
                    })
                    .collect()
            })
            .collect()
    }
}
