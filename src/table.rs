//! Plain-text data table.
//!
//! Records expose their cells through [`Tabular`]; each column names a
//! [`ColumnKind`] and [`format_cell`] turns the raw value into display text.
//! There is no sorting, filtering or paging: every render walks the full list.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use crate::models::Entity;

pub const DEFAULT_EMPTY_MESSAGE: &str = "Aucune donnée disponible";
const ACTIONS_HEADER: &str = "Actions";
const MISSING: &str = "-";

const MONTHS_SHORT: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// Raw value of one cell, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(Option<String>),
    Money(Vec<f64>),
    Flag(bool),
    Date(Option<DateTime<Utc>>),
    List(Vec<String>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(Some(value.into()))
    }

    pub fn optional(value: Option<&str>) -> Self {
        CellValue::Text(value.map(str::to_string))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Text,
    Currency,
    Badge { on: &'static str, off: &'static str },
    Date,
    Composite { separator: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(key: &'static str, header: &'static str, kind: ColumnKind) -> Self {
        Self { key, header, kind }
    }
}

pub trait Tabular: Entity {
    fn cell(&self, key: &str) -> CellValue;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Edit => "Modifier",
            RowAction::Delete => "Supprimer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions {
    pub edit: bool,
    pub delete: bool,
}

impl Actions {
    pub const ALL: Actions = Actions {
        edit: true,
        delete: true,
    };

    fn any(&self) -> bool {
        self.edit || self.delete
    }

    fn list(&self) -> Vec<RowAction> {
        let mut actions = Vec::new();
        if self.edit {
            actions.push(RowAction::Edit);
        }
        if self.delete {
            actions.push(RowAction::Delete);
        }
        actions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub empty_message: String,
    has_actions: bool,
}

impl Table {
    pub fn render<T: Tabular>(
        records: &[T],
        columns: &[Column],
        actions: Actions,
        empty_message: &str,
    ) -> Self {
        let mut headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
        if actions.any() {
            headers.push(ACTIONS_HEADER.to_string());
        }

        let rows = records
            .iter()
            .map(|record| {
                let mut cells: Vec<String> = columns
                    .iter()
                    .map(|column| format_cell(column.kind, &record.cell(column.key)))
                    .collect();
                let row_actions = actions.list();
                if !row_actions.is_empty() {
                    let labels: Vec<&str> = row_actions.iter().map(RowAction::label).collect();
                    cells.push(labels.join(" / "));
                }
                TableRow {
                    id: record.id().to_string(),
                    cells,
                    actions: row_actions,
                }
            })
            .collect();

        Table {
            headers,
            rows,
            empty_message: empty_message.to_string(),
            has_actions: actions.any(),
        }
    }

    pub fn has_actions(&self) -> bool {
        self.has_actions
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: &str) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Text of the cell under `header` in row `id`.
    pub fn cell(&self, id: &str, header: &str) -> Option<&str> {
        let column = self.headers.iter().position(|h| h == header)?;
        self.row(id)?.cells.get(column).map(String::as_str)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<&[String]> = self.rows.iter().map(|row| row.cells.as_slice()).collect();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for line in &lines {
            for (width, cell) in widths.iter_mut().zip(line.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let write_line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect();
            writeln!(f, "| {} |", padded.join(" | "))
        };

        write_line(f, &self.headers)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "|-{}-|", rule.join("-|-"))?;

        if lines.is_empty() {
            return writeln!(f, "{}", self.empty_message);
        }
        for line in &lines {
            write_line(f, *line)?;
        }
        Ok(())
    }
}

/// Formats one cell. Pure: the same kind and value always give the same text.
pub fn format_cell(kind: ColumnKind, value: &CellValue) -> String {
    match (kind, value) {
        (ColumnKind::Currency, CellValue::Money(prices)) => format_price_range(prices),
        (ColumnKind::Badge { on, off }, CellValue::Flag(flag)) => {
            (if *flag { on } else { off }).to_string()
        }
        (ColumnKind::Date, CellValue::Date(date)) => date
            .as_ref()
            .map(format_date)
            .unwrap_or_else(|| MISSING.to_string()),
        (ColumnKind::Composite { separator }, CellValue::List(parts)) => {
            join_parts(parts, separator)
        }
        (_, value) => plain(value),
    }
}

fn plain(value: &CellValue) -> String {
    match value {
        CellValue::Text(Some(text)) if !text.trim().is_empty() => text.clone(),
        CellValue::Text(_) => MISSING.to_string(),
        CellValue::Money(prices) => format_price_range(prices),
        CellValue::Flag(flag) => (if *flag { "Oui" } else { "Non" }).to_string(),
        CellValue::Date(Some(date)) => format_date(date),
        CellValue::Date(None) => MISSING.to_string(),
        CellValue::List(parts) => join_parts(parts, ", "),
    }
}

fn join_parts(parts: &[String], separator: &str) -> String {
    let kept: Vec<&str> = parts
        .iter()
        .map(String::as_str)
        .filter(|part| !part.trim().is_empty())
        .collect();
    if kept.is_empty() {
        MISSING.to_string()
    } else {
        kept.join(separator)
    }
}

/// `9.5` -> `9,50 €`, `1234.5` -> `1 234,50 €`.
pub fn format_euros(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let units = (cents / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    format!("{}{},{:02} €", sign, grouped, cents % 100)
}

/// One amount, or `min - max` when the prices differ.
pub fn format_price_range(prices: &[f64]) -> String {
    let mut finite = prices.iter().copied().filter(|p| p.is_finite());
    let Some(first) = finite.next() else {
        return MISSING.to_string();
    };
    let (min, max) = finite.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));

    if format_euros(min) == format_euros(max) {
        format_euros(min)
    } else {
        format!("{} - {}", format_euros(min), format_euros(max))
    }
}

/// `12 janv. 2025`
pub fn format_date(date: &DateTime<Utc>) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_SHORT[date.month0() as usize],
        date.year()
    )
}
