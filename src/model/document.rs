//! Document-level types.

use super::{MergedPage, Page, TableRendering};
use serde::{Deserialize, Serialize};

/// A document as emitted by the external parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Identifier, normally the source filename stem
    pub document_id: String,

    /// Pages in ascending page-number order
    pub pages: Vec<Page>,
}

impl ParsedDocument {
    /// Create a new empty document.
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            pages: Vec::new(),
        }
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Builder-style variant of [`ParsedDocument::add_page`].
    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by its page number.
    pub fn get_page(&self, page_number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Total number of elements across all pages.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(Page::element_count).sum()
    }

    /// Total number of tables across all pages.
    pub fn table_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.elements)
            .filter(|e| e.is_table())
            .count()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// A document after cleaning and table serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDocument {
    /// Identifier copied from the source document
    pub document_id: String,

    /// Table rendering used for this document
    pub table_rendering: TableRendering,

    /// Pages in source order
    pub pages: Vec<MergedPage>,
}

impl MergedDocument {
    /// Create a new empty merged document.
    pub fn new(document_id: impl Into<String>, table_rendering: TableRendering) -> Self {
        Self {
            document_id: document_id.into(),
            table_rendering,
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of elements across all pages.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(MergedPage::element_count).sum()
    }

    /// Convert document facts to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let lines = [
            "---".to_string(),
            format!("document_id: \"{}\"", escape_yaml(&self.document_id)),
            format!("pages: {}", self.page_count()),
            format!("table_rendering: {}", self.table_rendering),
            "---".to_string(),
            String::new(),
        ];
        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
