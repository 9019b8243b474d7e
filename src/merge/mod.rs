//! Merging parsed documents into cleaned, serialized documents.
//!
//! The merger walks pages and elements in source order. Text elements are
//! cleaned and dropped when nothing is left; tables have every cell cleaned
//! and are serialized with the run's [`TableRendering`]. Every decision is
//! counted in the document's [`SummaryEntry`].

mod summary;

pub use summary::{
    DocumentStatus, ProcessingSummary, SummaryEntry, TablesByMode, SUMMARY_FILE_NAME,
};

use crate::model::{
    Element, MergedDocument, MergedElement, MergedPage, ParsedDocument, Table, TableRendering,
};
use crate::parser::{Anomaly, ParseOptions, ParsedInput};
use crate::render::{
    inspect, serialize_for, CleanContext, CleanOutcome, CleanupOptions, CleanupPreset,
    HeaderFooterStats, TextCleaner,
};

/// Options for merging documents.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// How tables are rendered
    pub table_rendering: TableRendering,

    /// Text cleanup configuration
    pub cleanup: CleanupOptions,

    /// Input reading configuration
    pub parse: ParseOptions,
}

impl MergeOptions {
    /// Create new merge options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table rendering.
    pub fn with_table_rendering(mut self, rendering: TableRendering) -> Self {
        self.table_rendering = rendering;
        self
    }

    /// Set the table rendering from the two configuration switches.
    pub fn with_serialized_tables(
        mut self,
        use_serialized_tables: bool,
        serialized_instead_of_markdown: bool,
    ) -> Self {
        self.table_rendering =
            TableRendering::from_flags(use_serialized_tables, serialized_instead_of_markdown);
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Set cleanup options from a preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = CleanupOptions::from_preset(preset);
        self
    }

    /// Set reading options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Fail documents on any reading anomaly.
    pub fn strict(mut self) -> Self {
        self.parse = self.parse.strict();
        self
    }
}

/// Merges one document at a time.
pub struct ReportMerger {
    options: MergeOptions,
    cleaner: TextCleaner,
}

impl ReportMerger {
    /// Create a merger with the given options.
    pub fn new(options: MergeOptions) -> Self {
        let cleaner = TextCleaner::new(options.cleanup.clone());
        Self { options, cleaner }
    }

    /// Options this merger was built with.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge a document read with anomalies; they lead the warnings.
    pub fn merge_input(&self, input: ParsedInput) -> (MergedDocument, SummaryEntry) {
        let (merged, mut entry) = self.merge(&input.document);
        let mut warnings = input.warnings();
        warnings.append(&mut entry.warnings);
        entry.warnings = warnings;
        (merged, entry)
    }

    /// Merge a document.
    pub fn merge(&self, doc: &ParsedDocument) -> (MergedDocument, SummaryEntry) {
        let rendering = self.options.table_rendering;
        let mut entry = SummaryEntry::ok();
        let mut merged = MergedDocument::new(doc.document_id.clone(), rendering);

        // Rule-cleaned text of every text element, without header context
        let precleaned: Vec<Vec<Option<CleanOutcome>>> = doc
            .pages
            .iter()
            .map(|page| {
                page.elements
                    .iter()
                    .map(|e| {
                        e.text()
                            .map(|t| self.cleaner.clean_counted(t, CleanContext::default()))
                    })
                    .collect()
            })
            .collect();

        let stats = HeaderFooterStats::from_page_texts(
            precleaned
                .iter()
                .map(|page| page.iter().flatten().map(|o| o.text.as_str())),
            self.cleaner.options(),
        );
        if !stats.is_empty() {
            log::debug!(
                "{}: {} repeated header/footer texts over {} pages",
                doc.document_id,
                stats.len(),
                stats.page_count()
            );
        }

        for (page, cleaned) in doc.pages.iter().zip(precleaned) {
            let mut merged_page = MergedPage::new(page.page_number);

            for (index, (element, outcome)) in page.elements.iter().zip(cleaned).enumerate() {
                entry.element_count += 1;

                match (element, outcome) {
                    (Element::Table(table), _) => {
                        let table = self.clean_table(table, &mut entry);
                        for issue in inspect(&table, rendering) {
                            entry.warn(
                                Anomaly::Table {
                                    page_number: page.page_number,
                                    index,
                                    issue,
                                }
                                .to_string(),
                            );
                        }
                        merged_page
                            .elements
                            .push(MergedElement::Table(serialize_for(&table, rendering)));
                        entry.table_count += 1;
                        entry.tables_by_mode.record(rendering);
                    }
                    (_, Some(outcome)) => {
                        entry.glyph_corrections += outcome.corrections;

                        if stats.context_for(&outcome.text).is_repeated_header {
                            log::debug!(
                                "{}: page {}: removed repeated header/footer '{}'",
                                doc.document_id,
                                page.page_number,
                                outcome.text
                            );
                            entry.dropped_elements += 1;
                            entry.repeated_headers_removed += 1;
                            continue;
                        }
                        if outcome.text.is_empty() {
                            log::debug!(
                                "{}: page {}: dropped empty {} at {}",
                                doc.document_id,
                                page.page_number,
                                element.kind(),
                                index
                            );
                            entry.dropped_elements += 1;
                            continue;
                        }

                        if let Some(merged_element) =
                            MergedElement::from_text_element(element, outcome.text)
                        {
                            merged_page.elements.push(merged_element);
                        }
                    }
                    (_, None) => {}
                }
            }

            merged.pages.push(merged_page);
        }

        (merged, entry)
    }

    fn clean_table(&self, table: &Table, entry: &mut SummaryEntry) -> Table {
        table.map_cells(|cell| {
            let outcome = self.cleaner.clean_counted(cell, CleanContext::default());
            entry.glyph_corrections += outcome.corrections;
            outcome.text
        })
    }
}

impl Default for ReportMerger {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    fn table(rows: &[&[&str]]) -> Element {
        Element::Table(Table::from_rows(rows.iter().map(|r| r.iter().copied())))
    }

    #[test]
    fn test_merge_preserves_order() {
        let doc = ParsedDocument::new("report")
            .with_page(
                Page::new(1)
                    .with_element(Element::heading("Intro", 1))
                    .with_element(Element::paragraph("exam-\nple text"))
                    .with_element(table(&[&["A", "B"], &["1", "2"]])),
            )
            .with_page(Page::new(2).with_element(Element::list_item("  point  ")));

        let (merged, entry) = ReportMerger::default().merge(&doc);

        assert_eq!(merged.page_count(), 2);
        assert_eq!(merged.pages[0].page_number, 1);
        let kinds: Vec<&str> = merged.pages[0].elements.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["heading", "paragraph", "table"]);
        assert_eq!(merged.pages[0].elements[1].text(), Some("example text"));
        assert_eq!(merged.pages[1].elements[0].text(), Some("point"));

        assert!(entry.is_ok());
        assert_eq!(entry.element_count, 4);
        assert_eq!(entry.table_count, 1);
        assert_eq!(entry.tables_by_mode.markdown, 1);
        assert_eq!(entry.dropped_elements, 0);
        assert!(entry.warnings.is_empty());
    }

    #[test]
    fn test_empty_text_is_dropped_and_counted() {
        let doc = ParsedDocument::new("d").with_page(
            Page::new(1)
                .with_element(Element::paragraph("   \n "))
                .with_element(Element::paragraph("kept")),
        );

        let (merged, entry) = ReportMerger::default().merge(&doc);
        assert_eq!(merged.pages[0].element_count(), 1);
        assert_eq!(entry.element_count, 2);
        assert_eq!(entry.dropped_elements, 1);
        assert_eq!(entry.repeated_headers_removed, 0);
    }

    #[test]
    fn test_repeated_headers_removed() {
        let mut doc = ParsedDocument::new("d");
        for n in 1..=4 {
            doc.add_page(
                Page::new(n)
                    .with_element(Element::paragraph("ACME Corp  Annual Report"))
                    .with_element(Element::paragraph(format!("Body of page {}", n))),
            );
        }

        let (merged, entry) = ReportMerger::default().merge(&doc);
        assert_eq!(merged.element_count(), 4);
        assert_eq!(entry.dropped_elements, 4);
        assert_eq!(entry.repeated_headers_removed, 4);

        let options = MergeOptions::new().with_cleanup_preset(CleanupPreset::Minimal);
        let (merged, entry) = ReportMerger::new(options).merge(&doc);
        assert_eq!(merged.element_count(), 8);
        assert_eq!(entry.repeated_headers_removed, 0);
    }

    #[test]
    fn test_tables_are_never_removed() {
        let doc = ParsedDocument::new("d")
            .with_page(Page::new(1).with_element(table(&[])))
            .with_page(Page::new(2).with_element(table(&[&["A"], &["1"]])));

        let (merged, entry) = ReportMerger::default().merge(&doc);
        assert_eq!(merged.element_count(), 2);
        assert_eq!(entry.table_count, 2);
        assert_eq!(entry.warnings, vec!["page 1, element 0: table has no rows"]);
    }

    #[test]
    fn test_table_cells_cleaned_and_rendered_both() {
        let doc = ParsedDocument::new("d").with_page(
            Page::new(1).with_element(table(&[&["Metric", "Value"], &["Reve-\nnue", " 10 "]])),
        );

        let options = MergeOptions::new().with_serialized_tables(true, false);
        let (merged, entry) = ReportMerger::new(options).merge(&doc);

        let MergedElement::Table(table) = &merged.pages[0].elements[0] else {
            panic!("expected table");
        };
        assert_eq!(table.rows[1], vec!["Revenue".to_string(), "10".to_string()]);
        assert_eq!(table.natural_text.as_deref(), Some("Metric: Revenue; Value: 10"));
        assert!(table.markdown.is_some());
        assert_eq!(merged.table_rendering, TableRendering::Both);
        assert_eq!(entry.tables_by_mode.both, 1);
    }

    #[test]
    fn test_glyph_corrections_counted() {
        let doc = ParsedDocument::new("d").with_page(
            Page::new(1)
                .with_element(Element::paragraph("/one.tnum/two.tnum%"))
                .with_element(table(&[&["Year"], &["/two.pl/zero.pl"]])),
        );

        let (merged, entry) = ReportMerger::default().merge(&doc);
        assert_eq!(merged.pages[0].elements[0].text(), Some("12%"));
        assert_eq!(entry.glyph_corrections, 4);
    }

    #[test]
    fn test_merge_input_prepends_reader_warnings() {
        let input = ParsedInput {
            document: ParsedDocument::new("d").with_page(Page::new(1).with_element(table(&[]))),
            anomalies: vec![Anomaly::PagesReordered],
        };

        let (_, entry) = ReportMerger::default().merge_input(input);
        assert_eq!(entry.warnings.len(), 2);
        assert_eq!(entry.warnings[0], Anomaly::PagesReordered.to_string());
    }
}
