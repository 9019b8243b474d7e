//! Table serialization to Markdown and natural text.

use std::fmt;

use crate::model::{MergedTable, Table, TableRendering};

/// Textual form of a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationMode {
    /// Pipe-delimited Markdown table
    Markdown,
    /// One `header: value; ...` line per data row
    NaturalText,
}

/// Serialize a table in the given mode.
///
/// Tables with no rows or no columns serialize to an empty string.
pub fn serialize(table: &Table, mode: SerializationMode) -> String {
    if table.is_empty() {
        return String::new();
    }
    match mode {
        SerializationMode::Markdown => to_markdown_table(table),
        SerializationMode::NaturalText => to_natural_text(table),
    }
}

/// Serialize a table into the forms a rendering asks for.
pub fn serialize_for(table: &Table, rendering: TableRendering) -> MergedTable {
    let markdown = rendering
        .includes_markdown()
        .then(|| serialize(table, SerializationMode::Markdown));
    let natural_text = rendering
        .includes_natural_text()
        .then(|| serialize(table, SerializationMode::NaturalText));

    MergedTable {
        rows: table.rows.clone(),
        rendering,
        markdown,
        natural_text,
    }
}

fn to_markdown_table(table: &Table) -> String {
    let col_count = table.column_count();
    let mut lines = Vec::with_capacity(table.row_count() + 1);

    for row in 0..table.row_count() {
        let mut line = String::from("|");
        for col in 0..col_count {
            line.push(' ');
            line.push_str(&markdown_cell(table.cell(row, col)));
            line.push_str(" |");
        }
        lines.push(line);

        // Separator after header row
        if row == 0 {
            lines.push(format!("|{}", " --- |".repeat(col_count)));
        }
    }

    lines.join("\n")
}

fn to_natural_text(table: &Table) -> String {
    let col_count = table.column_count();
    let headers: Vec<String> = (0..col_count)
        .map(|col| single_line(table.cell(0, col)))
        .collect();

    let mut lines = Vec::new();
    for row in 1..table.row_count() {
        let pairs: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(col, header)| format!("{}: {}", header, single_line(table.cell(row, col))))
            .collect();
        if !pairs.is_empty() {
            lines.push(pairs.join("; "));
        }
    }

    lines.join("\n")
}

fn single_line(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn markdown_cell(cell: &str) -> String {
    single_line(cell).replace('|', "\\|")
}

/// Something about a table worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIssue {
    /// The table has no rows
    NoRows,
    /// Every row is empty
    NoColumns,
    /// Rows have different lengths
    IrregularRows {
        /// Shortest row
        min: usize,
        /// Longest row
        max: usize,
    },
    /// Only a header row, so no data lines
    HeaderOnly,
    /// Natural text requested but no column has a header
    NoHeaders,
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::NoRows => write!(f, "table has no rows"),
            TableIssue::NoColumns => write!(f, "table has no columns"),
            TableIssue::IrregularRows { min, max } => {
                write!(f, "table rows have irregular lengths ({} to {} cells)", min, max)
            }
            TableIssue::HeaderOnly => write!(f, "table has a header row but no data rows"),
            TableIssue::NoHeaders => {
                write!(f, "table has no column headers; natural text is empty")
            }
        }
    }
}

/// Report anomalies for a table about to be serialized with `rendering`.
pub fn inspect(table: &Table, rendering: TableRendering) -> Vec<TableIssue> {
    if table.row_count() == 0 {
        return vec![TableIssue::NoRows];
    }
    if table.column_count() == 0 {
        return vec![TableIssue::NoColumns];
    }

    let mut issues = Vec::new();
    if let Some((min, max)) = table.row_length_range() {
        if min != max {
            issues.push(TableIssue::IrregularRows { min, max });
        }
    }
    if table.row_count() == 1 {
        issues.push(TableIssue::HeaderOnly);
    }
    if rendering.includes_natural_text()
        && table
            .header()
            .map_or(true, |h| h.iter().all(|c| c.trim().is_empty()))
    {
        issues.push(TableIssue::NoHeaders);
    }
    issues
}
