//! Page-level types.

use super::{MergedTable, Table};
use serde::{Deserialize, Serialize};

/// A single page of a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed, unique within a document)
    pub page_number: u32,

    /// Content elements in reading order
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    /// Create a new empty page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            elements: Vec::new(),
        }
    }

    /// Add an element to the page.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Builder-style variant of [`Page::add_element`].
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Check if the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of elements on the page.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// A structural unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Body text
    Paragraph {
        /// Raw text
        text: String,
    },

    /// Section heading
    Heading {
        /// Heading level (1-6)
        level: u8,
        /// Raw text
        text: String,
    },

    /// A single list entry
    ListItem {
        /// Raw text
        text: String,
    },

    /// A table grid
    Table(Table),

    /// Caption of a figure
    FigureCaption {
        /// Raw text
        text: String,
    },
}

impl Element {
    /// Create a paragraph element.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Element::Paragraph { text: text.into() }
    }

    /// Create a heading element; the level is clamped to 1-6.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Element::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    /// Create a list item element.
    pub fn list_item(text: impl Into<String>) -> Self {
        Element::ListItem { text: text.into() }
    }

    /// Create a figure caption element.
    pub fn figure_caption(text: impl Into<String>) -> Self {
        Element::FigureCaption { text: text.into() }
    }

    /// Raw text of a text-bearing element.
    pub fn text(&self) -> Option<&str> {
        match self {
            Element::Paragraph { text }
            | Element::Heading { text, .. }
            | Element::ListItem { text }
            | Element::FigureCaption { text } => Some(text.as_str()),
            Element::Table(_) => None,
        }
    }

    /// Check if this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Element::Table(_))
    }

    /// Schema name of the element type.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Paragraph { .. } => "paragraph",
            Element::Heading { .. } => "heading",
            Element::ListItem { .. } => "list_item",
            Element::Table(_) => "table",
            Element::FigureCaption { .. } => "figure_caption",
        }
    }
}

/// A page after merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPage {
    /// Page number, copied from the source page
    pub page_number: u32,

    /// Cleaned elements in source order
    #[serde(default)]
    pub elements: Vec<MergedElement>,
}

impl MergedPage {
    /// Create a new empty merged page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            elements: Vec::new(),
        }
    }

    /// Get the number of elements on the page.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// A cleaned element; tables carry their serialized forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MergedElement {
    /// Body text
    Paragraph {
        /// Cleaned text
        text: String,
    },

    /// Section heading
    Heading {
        /// Heading level (1-6)
        level: u8,
        /// Cleaned text
        text: String,
    },

    /// A single list entry
    ListItem {
        /// Cleaned text
        text: String,
    },

    /// A serialized table
    Table(MergedTable),

    /// Caption of a figure
    FigureCaption {
        /// Cleaned text
        text: String,
    },
}

impl MergedElement {
    /// Build the merged counterpart of a text element with new text.
    ///
    /// Returns `None` for tables, which are merged through the serializer.
    pub fn from_text_element(element: &Element, text: String) -> Option<Self> {
        match element {
            Element::Paragraph { .. } => Some(MergedElement::Paragraph { text }),
            Element::Heading { level, .. } => Some(MergedElement::Heading {
                level: *level,
                text,
            }),
            Element::ListItem { .. } => Some(MergedElement::ListItem { text }),
            Element::FigureCaption { .. } => Some(MergedElement::FigureCaption { text }),
            Element::Table(_) => None,
        }
    }

    /// Cleaned text of a text-bearing element.
    pub fn text(&self) -> Option<&str> {
        match self {
            MergedElement::Paragraph { text }
            | MergedElement::Heading { text, .. }
            | MergedElement::ListItem { text }
            | MergedElement::FigureCaption { text } => Some(text.as_str()),
            MergedElement::Table(_) => None,
        }
    }

    /// Check if this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, MergedElement::Table(_))
    }

    /// Schema name of the element type.
    pub fn kind(&self) -> &'static str {
        match self {
            MergedElement::Paragraph { .. } => "paragraph",
            MergedElement::Heading { .. } => "heading",
            MergedElement::ListItem { .. } => "list_item",
            MergedElement::Table(_) => "table",
            MergedElement::FigureCaption { .. } => "figure_caption",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRendering;

    #[test]
    fn test_page_new() {
        let page = Page::new(3).with_element(Element::paragraph("Hello"));
        assert_eq!(page.page_number, 3);
        assert_eq!(page.element_count(), 1);
        assert!(!page.is_empty());
    }

    #[test]
    fn test_element_serde_tags() {
        let json = serde_json::to_value(Element::heading("Intro", 9)).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 6);

        let table = Element::Table(Table::from_rows(vec![vec!["A"], vec!["1"]]));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["type"], "table");
        assert_eq!(json["rows"][1][0], "1");

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_merged_table_serde() {
        let element = MergedElement::Table(MergedTable {
            rows: vec![vec!["A".to_string()]],
            rendering: TableRendering::Markdown,
            markdown: Some("| A |\n| --- |".to_string()),
            natural_text: None,
        });
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "table");
        assert_eq!(json["rendering"], "markdown");
        assert!(json.get("natural_text").is_none());
    }

    #[test]
    fn test_from_text_element_keeps_heading_level() {
        let merged = MergedElement::from_text_element(&Element::heading("x", 3), "y".into());
        assert_eq!(
            merged,
            Some(MergedElement::Heading {
                level: 3,
                text: "y".into()
            })
        );
        assert!(MergedElement::from_text_element(&Element::Table(Table::new()), "".into())
            .is_none());
    }
}
