//! Document model types for parsed and merged reports.
//!
//! `ParsedDocument` is the immutable input produced by the external parser;
//! `MergedDocument` is the cleaned, serialized form consumed by export. Both
//! keep pages and elements in source order.

mod document;
mod page;
mod table;

pub use document::{MergedDocument, ParsedDocument};
pub use page::{Element, MergedElement, MergedPage, Page};
pub use table::{MergedTable, Table, TableRendering, TABLE_DESCRIPTION_HEADING};
