//! Per-run processing summary.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, FailureKind, Result};
use crate::model::TableRendering;
use crate::render::{to_json_value, JsonFormat};

/// File name of the summary written next to the merged documents.
pub const SUMMARY_FILE_NAME: &str = "processing_summary.json";

/// Outcome of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Merged (possibly with warnings)
    #[default]
    Ok,
    /// Not merged; see `error`
    Failed,
}

/// Number of tables serialized per rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TablesByMode {
    /// Markdown only
    pub markdown: usize,
    /// Natural text only
    pub natural_text: usize,
    /// Markdown plus natural text
    pub both: usize,
}

impl TablesByMode {
    /// Count one table rendered with `rendering`.
    pub fn record(&mut self, rendering: TableRendering) {
        match rendering {
            TableRendering::Markdown => self.markdown += 1,
            TableRendering::NaturalText => self.natural_text += 1,
            TableRendering::Both => self.both += 1,
        }
    }

    /// Tables across all renderings.
    pub fn total(&self) -> usize {
        self.markdown + self.natural_text + self.both
    }
}

/// Summary of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Whether the document was merged
    pub status: DocumentStatus,

    /// Elements processed
    #[serde(default)]
    pub element_count: usize,

    /// Tables serialized
    #[serde(default)]
    pub table_count: usize,

    /// Tables serialized, by rendering
    #[serde(default)]
    pub tables_by_mode: TablesByMode,

    /// Text elements removed because their cleaned text was empty
    #[serde(default)]
    pub dropped_elements: usize,

    /// Of the dropped elements, those removed as running headers/footers
    #[serde(default)]
    pub repeated_headers_removed: usize,

    /// Glyph names repaired
    #[serde(default)]
    pub glyph_corrections: usize,

    /// Recovered anomalies, human readable
    #[serde(default)]
    pub warnings: Vec<String>,

    /// `<kind>: <message>` for failed documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryEntry {
    /// An empty successful entry.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A failed entry for an error.
    pub fn failed(error: &Error) -> Self {
        Self::failed_with(error.failure_kind(), error.to_string())
    }

    /// A failed entry with an explicit kind and message.
    pub fn failed_with(kind: FailureKind, message: impl AsRef<str>) -> Self {
        Self {
            status: DocumentStatus::Failed,
            error: Some(format!("{}: {}", kind, message.as_ref())),
            ..Self::default()
        }
    }

    /// Mark an entry failed, keeping the counts gathered so far.
    pub fn fail(&mut self, error: &Error) {
        self.status = DocumentStatus::Failed;
        self.error = Some(format!("{}: {}", error.failure_kind(), error));
    }

    /// Check if the document was merged.
    pub fn is_ok(&self) -> bool {
        self.status == DocumentStatus::Ok
    }

    /// Check if the document failed.
    pub fn is_failed(&self) -> bool {
        self.status == DocumentStatus::Failed
    }

    /// Add a warning.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Summary of a whole run, keyed by document key.
///
/// Serializes as a plain JSON object. Built by reducing per-document
/// results, so merging two summaries is a keyed union.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingSummary {
    entries: BTreeMap<String, SummaryEntry>,
}

impl ProcessingSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the entry for a document key, returning any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: SummaryEntry) -> Option<SummaryEntry> {
        self.entries.insert(key.into(), entry)
    }

    /// Entry for a document key.
    pub fn get(&self, key: &str) -> Option<&SummaryEntry> {
        self.entries.get(key)
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: ProcessingSummary) {
        self.entries.extend(other.entries);
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no document was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of merged documents.
    pub fn ok_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_ok()).count()
    }

    /// Number of failed documents.
    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_failed()).count()
    }

    /// Total warnings across documents.
    pub fn warning_count(&self) -> usize {
        self.entries.values().map(|e| e.warnings.len()).sum()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, SummaryEntry> {
        self.entries.iter()
    }

    /// Write the summary as `processing_summary.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(SUMMARY_FILE_NAME);
        let json = to_json_value(self, JsonFormat::Pretty)?;
        fs::write(&path, json)?;
        log::info!("Wrote summary for {} documents to {}", self.len(), path.display());
        Ok(path)
    }

    /// Load a summary written by [`ProcessingSummary::write_to`].
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl FromIterator<(String, SummaryEntry)> for ProcessingSummary {
    fn from_iter<I: IntoIterator<Item = (String, SummaryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ProcessingSummary {
    type Item = (&'a String, &'a SummaryEntry);
    type IntoIter = btree_map::Iter<'a, String, SummaryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
