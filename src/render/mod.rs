//! Rendering module: text cleanup, table serialization and output formats.

mod cleanup;
mod json;
mod markdown;
mod options;
mod table;

pub use cleanup::{
    CleanContext, CleanOutcome, CleanupOptions, CleanupPreset, CleanupRule, HeaderFooterStats,
    TextCleaner,
};
pub use json::{to_json, to_json_value, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::ExportOptions;
pub use table::{inspect, serialize, serialize_for, SerializationMode, TableIssue};
