//! Recoverable problems found while reading and merging a document.

use std::fmt;

use crate::render::TableIssue;

/// A recoverable problem with one document.
///
/// Lenient reading records anomalies and keeps going; their `Display` text
/// ends up in the summary entry's `warnings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// `document_id` missing or not a string
    MissingDocumentId {
        /// Identifier used instead
        fallback: String,
    },

    /// A page entry could not be used
    InvalidPage {
        /// Position in the `pages` array
        index: usize,
        /// What was wrong
        reason: String,
    },

    /// A page number occurred more than once
    DuplicatePage {
        /// Repeated page number
        page_number: u32,
    },

    /// Pages were not in ascending order and were sorted
    PagesReordered,

    /// A page had no `elements` array
    MissingElements {
        /// Page number
        page_number: u32,
    },

    /// An element could not be used
    InvalidElement {
        /// Page number
        page_number: u32,
        /// Position on the page
        index: usize,
        /// What was wrong
        reason: String,
    },

    /// An element type the reader does not know
    UnknownElementType {
        /// Page number
        page_number: u32,
        /// Position on the page
        index: usize,
        /// The `type` value
        kind: String,
    },

    /// A heading level outside 1-6
    HeadingLevelClamped {
        /// Page number
        page_number: u32,
        /// Position on the page
        index: usize,
        /// Level found in the input
        level: i64,
    },

    /// A table cell holding an array or object
    NonTextCell {
        /// Page number
        page_number: u32,
        /// Position on the page
        index: usize,
    },

    /// A table that serialized with problems
    Table {
        /// Page number
        page_number: u32,
        /// Position on the page
        index: usize,
        /// The problem
        issue: TableIssue,
    },

    /// Another input already used this document id
    DuplicateDocumentId {
        /// Identifier from the input
        document_id: String,
        /// Key the document was stored under
        key: String,
    },

    /// The document id would overwrite the processing summary
    ReservedDocumentId {
        /// Identifier from the input
        document_id: String,
        /// Key the document was stored under
        key: String,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MissingDocumentId { fallback } => {
                write!(f, "document_id missing; using '{}'", fallback)
            }
            Anomaly::InvalidPage { index, reason } => {
                write!(f, "pages[{}]: {}; page skipped", index, reason)
            }
            Anomaly::DuplicatePage { page_number } => {
                write!(f, "page {}: duplicate page_number; page skipped", page_number)
            }
            Anomaly::PagesReordered => write!(f, "pages were out of order and have been sorted"),
            Anomaly::MissingElements { page_number } => {
                write!(f, "page {}: elements missing; page kept empty", page_number)
            }
            Anomaly::InvalidElement {
                page_number,
                index,
                reason,
            } => write!(
                f,
                "page {}, element {}: {}; element skipped",
                page_number, index, reason
            ),
            Anomaly::UnknownElementType {
                page_number,
                index,
                kind,
            } => write!(
                f,
                "page {}, element {}: unknown element type '{}'; element skipped",
                page_number, index, kind
            ),
            Anomaly::HeadingLevelClamped {
                page_number,
                index,
                level,
            } => write!(
                f,
                "page {}, element {}: heading level {} clamped to 1-6",
                page_number, index, level
            ),
            Anomaly::NonTextCell { page_number, index } => write!(
                f,
                "page {}, element {}: table cell is not text; stored as JSON",
                page_number, index
            ),
            Anomaly::Table {
                page_number,
                index,
                issue,
            } => write!(f, "page {}, element {}: {}", page_number, index, issue),
            Anomaly::DuplicateDocumentId { document_id, key } => write!(
                f,
                "document_id '{}' already used by another input; stored as '{}'",
                document_id, key
            ),
            Anomaly::ReservedDocumentId { document_id, key } => write!(
                f,
                "document_id '{}' is reserved for the processing summary; stored as '{}'",
                document_id, key
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_display() {
        let anomaly = Anomaly::InvalidPage {
            index: 1,
            reason: "page_number missing".into(),
        };
        assert_eq!(anomaly.to_string(), "pages[1]: page_number missing; page skipped");

        let anomaly = Anomaly::Table {
            page_number: 2,
            index: 0,
            issue: TableIssue::NoRows,
        };
        assert_eq!(anomaly.to_string(), "page 2, element 0: table has no rows");
    }
}
