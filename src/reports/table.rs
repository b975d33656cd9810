//! Tabular report output and CSV rendering.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// How a column's values are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Date,
    /// Name of another document.
    Link,
    Data,
    Float,
    Currency,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub label: String,
    pub fieldname: &'static str,
    pub column_type: ColumnType,
    pub width: u16,
}

impl Column {
    pub fn new(label: impl Into<String>, fieldname: &'static str, column_type: ColumnType, width: u16) -> Self {
        Self {
            label: label.into(),
            fieldname,
            column_type,
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Date(NaiveDate),
    Number(Decimal),
    Empty,
}

/// Columns plus row data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Comma-separated output with a header line of column labels.
    ///
    /// Text is always quoted, currency and percent columns use two decimal
    /// places, lines end in CRLF.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            csv_field_str(&mut out, &column.label);
        }
        out.push_str("\r\n");

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let column_type = self.columns.get(i).map(|c| c.column_type);
                match cell {
                    Cell::Text(s) => csv_field_str(&mut out, s),
                    Cell::Date(d) => out.push_str(&d.format("%Y-%m-%d").to_string()),
                    Cell::Number(n) => csv_field_decimal(&mut out, *n, column_type),
                    Cell::Empty => {}
                }
            }
            out.push_str("\r\n");
        }
        out
    }
}

fn csv_field_str(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

fn csv_field_decimal(out: &mut String, d: Decimal, column_type: Option<ColumnType>) {
    match column_type {
        Some(ColumnType::Currency | ColumnType::Percent) => {
            out.push_str(&format!("{:.2}", d.round_dp(2)));
        }
        _ => out.push_str(&d.normalize().to_string()),
    }
}
