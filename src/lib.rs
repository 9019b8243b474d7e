//! # reportmd
//!
//! Merge parsed PDF report JSON into clean documents and export them as
//! Markdown.
//!
//! An external parser turns each PDF into a JSON document of pages and
//! elements. This library cleans the text (hyphenation, whitespace, glyph
//! artifacts, running headers/footers), serializes tables as Markdown
//! and/or natural text, and renders one Markdown file per document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reportmd::{merge_file, render};
//!
//! fn main() -> reportmd::Result<()> {
//!     // Merge a parsed document
//!     let (merged, summary) = merge_file("parsed/report.json")?;
//!     println!("{} warnings", summary.warnings.len());
//!
//!     // Convert to Markdown
//!     let options = render::ExportOptions::default();
//!     let markdown = render::to_markdown(&merged, &options);
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Text cleanup**: de-hyphenation, whitespace, ligatures, glyph names
//! - **Header/footer removal**: text repeated across pages is dropped
//! - **Table serialization**: Markdown, natural text, or both
//! - **Batch processing**: parallel per document with a JSON summary
//! - **Lenient input**: recoverable schema problems become warnings

pub mod batch;
pub mod detect;
pub mod error;
pub mod merge;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchEvent, BatchOptions, BatchProcessor};
pub use detect::{detect_kind_from_path, DocumentKind};
pub use error::{Error, FailureKind, Result};
pub use merge::{
    DocumentStatus, MergeOptions, ProcessingSummary, ReportMerger, SummaryEntry, TablesByMode,
};
pub use model::{
    Element, MergedDocument, MergedElement, MergedPage, MergedTable, Page, ParsedDocument, Table,
    TableRendering,
};
pub use parser::{Anomaly, ErrorMode, ParseOptions, ParsedInput, ReportParser};
pub use render::{CleanupOptions, CleanupPreset, ExportOptions, JsonFormat, TextCleaner};

use std::path::Path;

/// Read a parsed-document JSON file.
///
/// Recoverable schema problems are returned as anomalies instead of errors.
///
/// # Example
///
/// ```no_run
/// use reportmd::parse_file;
///
/// let input = parse_file("parsed/report.json").unwrap();
/// println!("Pages: {}", input.document.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedInput> {
    let parser = ReportParser::open(path)?;
    parser.parse()
}

/// Read a parsed-document JSON file with custom options.
///
/// # Example
///
/// ```no_run
/// use reportmd::{parse_file_with_options, ParseOptions};
///
/// let input = parse_file_with_options("parsed/report.json", ParseOptions::new().strict());
/// assert!(input.is_ok() || input.is_err());
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<ParsedInput> {
    let parser = ReportParser::open_with_options(path, options)?;
    parser.parse()
}

/// Read parsed-document JSON from a string.
pub fn parse_str(json: &str) -> Result<ParsedInput> {
    let parser = ReportParser::from_json(json)?;
    parser.parse()
}

/// Merge a parsed-document JSON file with default options.
///
/// # Example
///
/// ```no_run
/// use reportmd::merge_file;
///
/// let (merged, summary) = merge_file("parsed/report.json").unwrap();
/// println!("{} tables", summary.table_count);
/// ```
pub fn merge_file<P: AsRef<Path>>(path: P) -> Result<(MergedDocument, SummaryEntry)> {
    merge_file_with_options(path, &MergeOptions::default())
}

/// Merge a parsed-document JSON file with custom options.
///
/// # Example
///
/// ```no_run
/// use reportmd::{merge_file_with_options, MergeOptions, TableRendering};
///
/// let options = MergeOptions::new().with_table_rendering(TableRendering::Both);
/// let (merged, _) = merge_file_with_options("parsed/report.json", &options).unwrap();
/// ```
pub fn merge_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &MergeOptions,
) -> Result<(MergedDocument, SummaryEntry)> {
    let input = parse_file_with_options(path, options.parse.clone())?;
    Ok(ReportMerger::new(options.clone()).merge_input(input))
}

/// Merge a parsed-document JSON file asynchronously.
#[cfg(feature = "async")]
pub async fn merge_file_async<P: AsRef<Path>>(
    path: P,
    options: &MergeOptions,
) -> Result<(MergedDocument, SummaryEntry)> {
    let path = path.as_ref();
    let data = parser::decode_utf8(tokio::fs::read(path).await?)?;

    let mut parse = options.parse.clone();
    if parse.fallback_id.is_none() {
        parse.fallback_id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }

    let input = ReportParser::from_json_with_options(&data, parse)?.parse()?;
    Ok(ReportMerger::new(options.clone()).merge_input(input))
}

/// Convert a parsed or merged JSON file to Markdown.
///
/// # Example
///
/// ```no_run
/// use reportmd::to_markdown;
///
/// let markdown = to_markdown("merged/report.json").unwrap();
/// std::fs::write("report.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    to_markdown_with_options(path, &ExportOptions::default())
}

/// Convert a parsed or merged JSON file to Markdown with custom options.
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &ExportOptions,
) -> Result<String> {
    let (merged, _) = batch::load_document(path.as_ref(), &ReportMerger::default())?;
    Ok(render::to_markdown(&merged, options))
}

/// Merge a parsed-document JSON file and return the merged JSON.
///
/// # Example
///
/// ```no_run
/// use reportmd::{to_json, JsonFormat};
///
/// let json = to_json("parsed/report.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("merged.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let (merged, _) = merge_file(path)?;
    render::to_json(&merged, format)
}

/// Merge every parsed document in a directory.
///
/// # Example
///
/// ```no_run
/// use reportmd::{merge_directory, BatchOptions};
///
/// let summary = merge_directory("parsed", "merged", &BatchOptions::default()).unwrap();
/// println!("{} ok, {} failed", summary.ok_count(), summary.failed_count());
/// ```
pub fn merge_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    merged_dir: Q,
    options: &BatchOptions,
) -> Result<ProcessingSummary> {
    BatchProcessor::new(options.clone()).merge_directory(input_dir.as_ref(), merged_dir.as_ref())
}

/// Export every document in a directory to Markdown.
pub fn export_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    markdown_dir: Q,
    options: &BatchOptions,
) -> Result<ProcessingSummary> {
    BatchProcessor::new(options.clone())
        .export_directory(input_dir.as_ref(), markdown_dir.as_ref())
}

/// Merge and export a directory in one pass.
pub fn run_pipeline<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
) -> Result<ProcessingSummary> {
    BatchProcessor::new(options.clone()).run_pipeline(input_dir.as_ref(), output_dir.as_ref())
}

/// Builder for merging and exporting single documents.
///
/// # Example
///
/// ```no_run
/// use reportmd::{ReportMd, TableRendering, CleanupPreset};
///
/// let markdown = ReportMd::new()
///     .with_table_rendering(TableRendering::Both)
///     .with_cleanup(CleanupPreset::Aggressive)
///     .with_frontmatter()
///     .merge("parsed/report.json")?
///     .to_markdown();
/// # Ok::<(), reportmd::Error>(())
/// ```
pub struct ReportMd {
    merge_options: MergeOptions,
    export_options: ExportOptions,
}

impl ReportMd {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            merge_options: MergeOptions::default(),
            export_options: ExportOptions::default(),
        }
    }

    /// Set the table rendering.
    pub fn with_table_rendering(mut self, rendering: TableRendering) -> Self {
        self.merge_options = self.merge_options.with_table_rendering(rendering);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.merge_options = self.merge_options.with_cleanup_preset(preset);
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup_options(mut self, cleanup: CleanupOptions) -> Self {
        self.merge_options = self.merge_options.with_cleanup(cleanup);
        self
    }

    /// Fail on any input anomaly.
    pub fn strict(mut self) -> Self {
        self.merge_options = self.merge_options.strict();
        self
    }

    /// Skip invalid input and record warnings (the default).
    pub fn lenient(mut self) -> Self {
        self.merge_options.parse = self.merge_options.parse.lenient();
        self
    }

    /// Enable frontmatter in Markdown output.
    pub fn with_frontmatter(mut self) -> Self {
        self.export_options = self.export_options.with_frontmatter(true);
        self
    }

    /// Insert a rule between pages in Markdown output.
    pub fn with_page_separator(mut self) -> Self {
        self.export_options = self.export_options.with_page_separator(true);
        self
    }

    /// Merge a parsed-document JSON file.
    pub fn merge<P: AsRef<Path>>(self, path: P) -> Result<ReportResult> {
        let (document, summary) = merge_file_with_options(path, &self.merge_options)?;
        Ok(ReportResult {
            document,
            summary,
            export_options: self.export_options,
        })
    }

    /// Merge parsed-document JSON from a string.
    pub fn merge_str(self, json: &str) -> Result<ReportResult> {
        let parser = ReportParser::from_json_with_options(json, self.merge_options.parse.clone())?;
        let input = parser.parse()?;
        let (document, summary) = ReportMerger::new(self.merge_options).merge_input(input);
        Ok(ReportResult {
            document,
            summary,
            export_options: self.export_options,
        })
    }
}

impl Default for ReportMd {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of merging a document.
pub struct ReportResult {
    /// The merged document
    pub document: MergedDocument,
    /// Summary of the merge
    pub summary: SummaryEntry,
    /// Export options to use
    export_options: ExportOptions,
}

impl ReportResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> String {
        render::to_markdown(&self.document, &self.export_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get the document.
    pub fn document(&self) -> &MergedDocument {
        &self.document
    }

    /// Get the summary entry.
    pub fn summary(&self) -> &SummaryEntry {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "document_id": "sample",
        "pages": [
            { "page_number": 1, "elements": [
                { "type": "heading", "level": 1, "text": "Results" },
                { "type": "paragraph", "text": "exam-\nple text" },
                { "type": "table", "rows": [["A", "B"], ["1", "2"]] }
            ]}
        ]
    }"#;

    #[test]
    fn test_report_md_builder() {
        let builder = ReportMd::new()
            .strict()
            .with_frontmatter()
            .with_cleanup(CleanupPreset::Aggressive);

        assert_eq!(builder.merge_options.parse.error_mode, ErrorMode::Strict);
        assert!(builder.export_options.include_frontmatter);
        assert_eq!(
            builder.merge_options.cleanup,
            CleanupOptions::from_preset(CleanupPreset::Aggressive)
        );
    }

    #[test]
    fn test_report_md_builder_default() {
        let builder = ReportMd::default();
        assert!(!builder.export_options.include_frontmatter);
        assert_eq!(builder.merge_options.parse.error_mode, ErrorMode::Lenient);
        assert_eq!(
            builder.merge_options.table_rendering,
            TableRendering::Markdown
        );
    }

    #[test]
    fn test_merge_str_to_markdown() {
        let result = ReportMd::new().merge_str(SAMPLE).unwrap();
        assert_eq!(
            result.to_markdown(),
            "## Page 1\n\n# Results\n\nexample text\n\n| A | B |\n| --- | --- |\n| 1 | 2 |\n"
        );
        assert_eq!(result.summary().table_count, 1);
    }

    #[test]
    fn test_merge_str_natural_text() {
        let result = ReportMd::new()
            .with_table_rendering(TableRendering::NaturalText)
            .merge_str(SAMPLE)
            .unwrap();
        assert!(result.to_markdown().ends_with("example text\n\nA: 1; B: 2\n"));
        assert!(result
            .to_json(JsonFormat::Compact)
            .unwrap()
            .contains("\"natural_text\":\"A: 1; B: 2\""));
    }

    #[test]
    fn test_parse_str_invalid() {
        assert!(parse_str("not json").is_err());
        assert!(parse_str("[]").is_err());
    }

    #[test]
    fn test_merge_file_and_to_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let (merged, summary) = merge_file(&path).unwrap();
        assert_eq!(merged.document_id, "sample");
        assert!(summary.is_ok());

        let markdown = to_markdown(&path).unwrap();
        assert!(markdown.starts_with("## Page 1\n\n# Results"));
    }
}
