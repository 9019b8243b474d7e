//! Table types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A table as a grid of cell strings.
///
/// Rows may have different lengths; missing trailing cells are read as empty
/// strings and the column count is the length of the longest row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table, the first one being the header
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Create a table from any nested sequence of strings.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (longest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// A table with no rows or no columns has nothing to render.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Get a cell, treating cells past the end of a short row as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Get the header row.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Get body rows (everything after the header).
    pub fn body(&self) -> &[Vec<String>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// Shortest and longest row length.
    pub fn row_length_range(&self) -> Option<(usize, usize)> {
        let min = self.rows.iter().map(Vec::len).min()?;
        let max = self.rows.iter().map(Vec::len).max()?;
        Some((min, max))
    }

    /// Check whether rows have different lengths.
    pub fn is_ragged(&self) -> bool {
        matches!(self.row_length_range(), Some((min, max)) if min != max)
    }

    /// Build a new table by applying `f` to every cell.
    pub fn map_cells(&self, mut f: impl FnMut(&str) -> String) -> Table {
        Table {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|c| f(c)).collect())
                .collect(),
        }
    }
}

/// How tables are rendered in merged output.
///
/// One value applies to a whole run; there is no per-table switching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRendering {
    /// Pipe-delimited Markdown table
    #[default]
    Markdown,
    /// Flattened `header: value` lines instead of the Markdown table
    NaturalText,
    /// Markdown table followed by the natural text lines
    Both,
}

impl TableRendering {
    /// Map the two configuration switches onto a rendering.
    ///
    /// `serialized_instead_of_markdown` has no effect unless
    /// `use_serialized_tables` is set.
    pub fn from_flags(use_serialized_tables: bool, serialized_instead_of_markdown: bool) -> Self {
        match (use_serialized_tables, serialized_instead_of_markdown) {
            (false, _) => TableRendering::Markdown,
            (true, true) => TableRendering::NaturalText,
            (true, false) => TableRendering::Both,
        }
    }

    /// Whether a Markdown table is produced.
    pub fn includes_markdown(self) -> bool {
        matches!(self, TableRendering::Markdown | TableRendering::Both)
    }

    /// Whether natural text lines are produced.
    pub fn includes_natural_text(self) -> bool {
        matches!(self, TableRendering::NaturalText | TableRendering::Both)
    }

    /// Name used in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            TableRendering::Markdown => "markdown",
            TableRendering::NaturalText => "natural_text",
            TableRendering::Both => "both",
        }
    }
}

impl fmt::Display for TableRendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading placed between the Markdown table and its natural text lines.
pub const TABLE_DESCRIPTION_HEADING: &str = "Description of the table entities:";

/// A table after merging: cleaned cells plus its serialized forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTable {
    /// Cleaned cell grid
    pub rows: Vec<Vec<String>>,

    /// Rendering chosen for the run
    pub rendering: TableRendering,

    /// Markdown form, present when the rendering includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    /// Natural text form, present when the rendering includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_text: Option<String>,
}

impl MergedTable {
    /// Text to emit for this table, combining the stored forms.
    pub fn rendered_text(&self) -> String {
        let markdown = self.markdown.as_deref().unwrap_or("");
        let natural = self.natural_text.as_deref().unwrap_or("");

        match self.rendering {
            TableRendering::Markdown => markdown.to_string(),
            TableRendering::NaturalText => natural.to_string(),
            TableRendering::Both => match (markdown.is_empty(), natural.is_empty()) {
                (true, _) => natural.to_string(),
                (false, true) => markdown.to_string(),
                (false, false) => {
                    format!("{}\n\n{}\n{}", markdown, TABLE_DESCRIPTION_HEADING, natural)
                }
            },
        }
    }
}
