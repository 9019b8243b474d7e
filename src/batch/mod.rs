//! Directory-level merge and export.
//!
//! Each input file is one independent task. Files are loaded and merged in
//! parallel with rayon, keys are claimed in file-name order, and the outputs
//! are written in parallel again. Every task ends as `(key, SummaryEntry)`;
//! the entries are reduced into a [`ProcessingSummary`] once all are done. A failing document
//! never stops the others. Only listing the input directory or creating an
//! output directory fails the whole batch.

mod keys;

pub use keys::{sanitize_key, KeyRegistry};

use crossbeam_channel::Sender;
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::{detect_kind_from_value, is_json_file, is_summary_file, DocumentKind};
use crate::error::Result;
use crate::merge::{DocumentStatus, MergeOptions, ProcessingSummary, ReportMerger, SummaryEntry};
use crate::model::{MergedDocument, MergedElement};
use crate::parser::{read_json_text, ReportParser};
use crate::render::{to_json, to_markdown, ExportOptions, JsonFormat};

/// Sub-directory of a run's output holding merged JSON.
pub const MERGED_DIR_NAME: &str = "merged";

/// Sub-directory of a run's output holding Markdown.
pub const MARKDOWN_DIR_NAME: &str = "markdown";

/// Options for batch processing.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Process documents in parallel
    pub parallel: bool,

    /// Format of merged JSON files
    pub json_format: JsonFormat,

    /// Merge configuration
    pub merge: MergeOptions,

    /// Markdown export configuration
    pub export: ExportOptions,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the merged JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set merge options.
    pub fn with_merge_options(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    /// Set export options.
    pub fn with_export_options(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            json_format: JsonFormat::Pretty,
            merge: MergeOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

/// Progress notifications sent while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The input directory was listed
    Started {
        /// Number of documents to process
        total: usize,
    },
    /// One document is done
    DocumentFinished {
        /// Key the document was recorded under
        key: String,
        /// Outcome
        status: DocumentStatus,
        /// Number of warnings
        warnings: usize,
    },
    /// Every document is done
    Finished {
        /// Documents that succeeded
        ok: usize,
        /// Documents that failed
        failed: usize,
    },
}

/// Runs merge and export over directories.
pub struct BatchProcessor {
    options: BatchOptions,
    merger: ReportMerger,
    events: Option<Sender<BatchEvent>>,
}

impl BatchProcessor {
    /// Create a processor with the given options.
    pub fn new(options: BatchOptions) -> Self {
        let merger = ReportMerger::new(options.merge.clone());
        Self {
            options,
            merger,
            events: None,
        }
    }

    /// Send progress events to a channel.
    pub fn with_events(mut self, sender: Sender<BatchEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Options this processor was built with.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Merge every parsed document in `input_dir` into `merged_dir`.
    ///
    /// Writes `<key>.json` per document and `processing_summary.json`.
    pub fn merge_directory(&self, input_dir: &Path, merged_dir: &Path) -> Result<ProcessingSummary> {
        self.run_stages(input_dir, Some(merged_dir), None)
    }

    /// Export every document in `input_dir` to `<key>.md` in `markdown_dir`.
    ///
    /// Accepts merged documents and raw parsed documents, which are merged
    /// in memory first. The summary is returned but not written.
    pub fn export_directory(
        &self,
        input_dir: &Path,
        markdown_dir: &Path,
    ) -> Result<ProcessingSummary> {
        let files = list_json_files(input_dir)?;
        fs::create_dir_all(markdown_dir)?;
        log::info!(
            "Exporting {} documents from {} to {}",
            files.len(),
            input_dir.display(),
            markdown_dir.display()
        );

        Ok(self.process(
            files,
            |path| load_document(path, &self.merger),
            |merged, key| self.write_markdown(merged, markdown_dir, key),
        ))
    }

    /// Merge and export in one pass.
    ///
    /// Merged JSON and the summary go to `output_dir/merged`, Markdown to
    /// `output_dir/markdown`.
    pub fn run_pipeline(&self, input_dir: &Path, output_dir: &Path) -> Result<ProcessingSummary> {
        let merged_dir = output_dir.join(MERGED_DIR_NAME);
        let markdown_dir = output_dir.join(MARKDOWN_DIR_NAME);
        self.run_stages(
            input_dir,
            Some(merged_dir.as_path()),
            Some(markdown_dir.as_path()),
        )
    }

    fn run_stages(
        &self,
        input_dir: &Path,
        merged_dir: Option<&Path>,
        markdown_dir: Option<&Path>,
    ) -> Result<ProcessingSummary> {
        let files = list_json_files(input_dir)?;
        for dir in merged_dir.iter().chain(markdown_dir.iter()) {
            fs::create_dir_all(dir)?;
        }
        log::info!(
            "Merging {} documents from {} ({} tables)",
            files.len(),
            input_dir.display(),
            self.options.merge.table_rendering
        );

        let summary = self.process(
            files,
            |path| self.merge_one(path),
            |merged, key| {
                if let Some(dir) = merged_dir {
                    self.write_merged(merged, dir, key)?;
                }
                if let Some(dir) = markdown_dir {
                    self.write_markdown(merged, dir, key)?;
                }
                Ok(())
            },
        );

        if let Some(dir) = merged_dir {
            summary.write_to(dir)?;
        }
        Ok(summary)
    }

    /// Load every file, claim keys in file order, then write the outputs.
    ///
    /// Loading and writing run in parallel; claiming is sequential so that
    /// repeated document ids get the same keys on every run.
    fn process<L, W>(&self, files: Vec<PathBuf>, load: L, write: W) -> ProcessingSummary
    where
        L: Fn(&Path) -> Result<(MergedDocument, SummaryEntry)> + Send + Sync,
        W: Fn(&MergedDocument, &str) -> Result<()> + Send + Sync,
    {
        self.notify(BatchEvent::Started { total: files.len() });

        let loaded: Vec<Result<(MergedDocument, SummaryEntry)>> = if self.options.parallel {
            files.par_iter().map(|path| load(path.as_path())).collect()
        } else {
            files.iter().map(|path| load(path.as_path())).collect()
        };

        let registry = KeyRegistry::new();
        let claimed: Vec<(String, Result<(MergedDocument, SummaryEntry)>)> = files
            .iter()
            .zip(loaded)
            .map(|(path, loaded)| claim_key(path, &registry, loaded))
            .collect();

        let finish = |(key, loaded): (String, Result<(MergedDocument, SummaryEntry)>)| {
            let entry = match loaded {
                Ok((merged, mut entry)) => {
                    if let Err(e) = write(&merged, &key) {
                        log::warn!("{}: {}", key, e);
                        entry.fail(&e);
                    }
                    entry
                }
                Err(e) => SummaryEntry::failed(&e),
            };
            self.notify(BatchEvent::DocumentFinished {
                key: key.clone(),
                status: entry.status,
                warnings: entry.warnings.len(),
            });
            (key, entry)
        };

        let results: Vec<(String, SummaryEntry)> = if self.options.parallel {
            claimed.into_par_iter().map(finish).collect()
        } else {
            claimed.into_iter().map(finish).collect()
        };

        let summary: ProcessingSummary = results.into_iter().collect();
        log::info!(
            "Processed {} documents: {} ok, {} failed",
            summary.len(),
            summary.ok_count(),
            summary.failed_count()
        );
        self.notify(BatchEvent::Finished {
            ok: summary.ok_count(),
            failed: summary.failed_count(),
        });
        summary
    }

    fn notify(&self, event: BatchEvent) {
        if let Some(sender) = &self.events {
            // The receiver may have gone away; progress is best effort
            let _ = sender.send(event);
        }
    }

    fn merge_one(&self, path: &Path) -> Result<(MergedDocument, SummaryEntry)> {
        let parse = self.options.merge.parse.clone();
        let input = ReportParser::open_with_options(path, parse)?.parse()?;
        Ok(self.merger.merge_input(input))
    }

    fn write_merged(&self, merged: &MergedDocument, dir: &Path, key: &str) -> Result<()> {
        let path = dir.join(format!("{}.json", key));
        fs::write(&path, to_json(merged, self.options.json_format)?)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn write_markdown(&self, merged: &MergedDocument, dir: &Path, key: &str) -> Result<()> {
        let path = dir.join(format!("{}.md", key));
        fs::write(&path, to_markdown(merged, &self.options.export))?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(BatchOptions::default())
    }
}

/// List the `.json` files of a directory in name order, skipping summaries.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_json_file(&path) && !is_summary_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read a merged document, or merge a parsed one in memory.
pub fn load_document(path: &Path, merger: &ReportMerger) -> Result<(MergedDocument, SummaryEntry)> {
    let data = read_json_text(path)?;
    let value: Value = serde_json::from_str(&data)?;

    match detect_kind_from_value(&value)? {
        DocumentKind::Merged => {
            let merged: MergedDocument = serde_json::from_value(value)?;
            let entry = entry_for_merged(&merged);
            Ok((merged, entry))
        }
        DocumentKind::Parsed => {
            log::debug!("{}: parsed input, merging before export", path.display());
            let mut parse = merger.options().parse.clone();
            if parse.fallback_id.is_none() {
                parse.fallback_id = Some(file_stem(path));
            }
            let input = ReportParser::from_value(value, parse).parse()?;
            Ok(merger.merge_input(input))
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Give a loaded document its key; failed loads are keyed by file stem.
fn claim_key(
    path: &Path,
    registry: &KeyRegistry,
    loaded: Result<(MergedDocument, SummaryEntry)>,
) -> (String, Result<(MergedDocument, SummaryEntry)>) {
    match loaded {
        Ok((merged, mut entry)) => {
            let (key, anomaly) = registry.claim(&merged.document_id);
            if let Some(anomaly) = anomaly {
                log::warn!("{}: {}", path.display(), anomaly);
                entry.warn(anomaly.to_string());
            }
            (key, Ok((merged, entry)))
        }
        Err(e) => {
            log::warn!("{}: {}", path.display(), e);
            let (key, _) = registry.claim(&file_stem(path));
            (key, Err(e))
        }
    }
}

fn entry_for_merged(merged: &MergedDocument) -> SummaryEntry {
    let mut entry = SummaryEntry::ok();
    entry.element_count = merged.element_count();
    for element in merged.pages.iter().flat_map(|p| &p.elements) {
        if let MergedElement::Table(table) = element {
            entry.table_count += 1;
            entry.tables_by_mode.record(table.rendering);
        }
    }
    entry
}
