//! reportmd CLI - merge parsed PDF reports and export them to Markdown

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use reportmd::{
    detect_kind_from_path, BatchEvent, BatchOptions, BatchProcessor, CleanupPreset,
    DocumentKind, DocumentStatus, ExportOptions, JsonFormat, MergeOptions, MergedDocument,
    MergedElement, ParseOptions, ProcessingSummary, TableRendering,
};

#[derive(Parser)]
#[command(name = "reportmd")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Merge parsed PDF reports and export them to Markdown", long_about = None)]
struct Cli {
    /// Log progress details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge parsed JSON documents into cleaned, serialized JSON
    Merge {
        /// Directory of parsed JSON documents
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// Directory for merged JSON and processing_summary.json
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[command(flatten)]
        merge: MergeArgs,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Export merged (or raw parsed) JSON documents to Markdown
    #[command(alias = "md")]
    Export {
        /// Directory of merged or parsed JSON documents
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// Directory for Markdown files
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[command(flatten)]
        export: ExportArgs,

        #[command(flatten)]
        merge: MergeArgs,
    },

    /// Merge and export in one pass (OUTPUT/merged, OUTPUT/markdown)
    Run {
        /// Directory of parsed JSON documents
        #[arg(short, long, value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        #[command(flatten)]
        merge: MergeArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show document information
    Info {
        /// Parsed or merged JSON document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct MergeArgs {
    /// Add natural-text table descriptions
    #[arg(long, env = "REPORTMD_USE_SERIALIZED_TABLES")]
    use_serialized_tables: bool,

    /// With --use-serialized-tables, drop the Markdown table
    #[arg(long, env = "REPORTMD_SERIALIZED_INSTEAD_OF_MARKDOWN")]
    serialized_instead_of_markdown: bool,

    /// Text cleanup preset
    #[arg(long, value_enum, default_value = "standard")]
    cleanup: CleanupLevel,

    /// Fail documents on any schema anomaly
    #[arg(long)]
    strict: bool,

    /// Process documents one at a time
    #[arg(long)]
    sequential: bool,
}

impl MergeArgs {
    fn batch_options(&self) -> BatchOptions {
        let mut parse = ParseOptions::new();
        if self.strict {
            parse = parse.strict();
        }

        let merge = MergeOptions::new()
            .with_serialized_tables(
                self.use_serialized_tables,
                self.serialized_instead_of_markdown,
            )
            .with_cleanup_preset(self.cleanup.into())
            .with_parse_options(parse);

        BatchOptions::new()
            .with_parallel(!self.sequential)
            .with_merge_options(merge)
    }
}

#[derive(Args)]
struct ExportArgs {
    /// Include YAML frontmatter
    #[arg(short, long)]
    frontmatter: bool,

    /// Insert a horizontal rule between pages
    #[arg(long)]
    page_separator: bool,

    /// Heading level of the page markers (1-6)
    #[arg(long, default_value = "2")]
    page_heading: u8,
}

impl ExportArgs {
    fn export_options(&self) -> ExportOptions {
        ExportOptions::new()
            .with_frontmatter(self.frontmatter)
            .with_page_separator(self.page_separator)
            .with_page_heading_level(self.page_heading)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Hyphenation and whitespace only
    Minimal,
    /// Adds Unicode, ligature and glyph repair plus header/footer removal
    Standard,
    /// Also strips private-use characters
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Merge {
            input,
            output,
            merge,
            compact,
        } => cmd_merge(&input, &output, &merge, compact),
        Commands::Export {
            input,
            output,
            export,
            merge,
        } => cmd_export(&input, &output, &merge, &export),
        Commands::Run {
            input,
            output,
            merge,
            export,
        } => cmd_run(&input, &output, &merge, &export),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_merge(
    input: &Path,
    output: &Path,
    merge: &MergeArgs,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let options = merge.batch_options().with_json_format(format);
    let rendering = options.merge.table_rendering;

    let summary = with_progress(options, |p| p.merge_directory(input, output))?;
    print_summary(&summary);

    println!(
        "\n{} {} ({} tables)",
        "Merged into".green(),
        output.display(),
        rendering
    );
    Ok(())
}

fn cmd_export(
    input: &Path,
    output: &Path,
    merge: &MergeArgs,
    export: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = merge
        .batch_options()
        .with_export_options(export.export_options());

    let summary = with_progress(options, |p| p.export_directory(input, output))?;
    print_summary(&summary);

    println!("\n{} {}", "Markdown saved to".green(), output.display());
    Ok(())
}

fn cmd_run(
    input: &Path,
    output: &Path,
    merge: &MergeArgs,
    export: &ExportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = merge
        .batch_options()
        .with_export_options(export.export_options());

    let summary = with_progress(options, |p| p.run_pipeline(input, output))?;
    print_summary(&summary);

    println!("\n{}", "Output directories:".green().bold());
    println!("  {} merged/", "├─".dimmed());
    println!("  {} markdown/", "└─".dimmed());
    Ok(())
}

/// Run a batch while a progress bar follows its events.
fn with_progress<F>(options: BatchOptions, run: F) -> reportmd::Result<ProcessingSummary>
where
    F: FnOnce(&BatchProcessor) -> reportmd::Result<ProcessingSummary>,
{
    let (sender, receiver) = crossbeam_channel::unbounded();
    let processor = BatchProcessor::new(options).with_events(sender);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let bar = pb.clone();
    let listener = thread::spawn(move || {
        for event in receiver {
            match event {
                BatchEvent::Started { total } => bar.set_length(total as u64),
                BatchEvent::DocumentFinished { key, status, .. } => {
                    if status == DocumentStatus::Failed {
                        bar.println(format!("{} {}", "Failed".red(), key));
                    }
                    bar.set_message(key);
                    bar.inc(1);
                }
                BatchEvent::Finished { .. } => bar.finish_and_clear(),
            }
        }
    });

    let result = run(&processor);
    // Closes the channel so the listener ends
    drop(processor);
    let _ = listener.join();
    pb.finish_and_clear();

    result
}

fn print_summary(summary: &ProcessingSummary) {
    println!(
        "{} {} documents: {} ok, {} failed, {} warnings",
        "Processed".cyan().bold(),
        summary.len(),
        summary.ok_count().to_string().green(),
        summary.failed_count().to_string().red(),
        summary.warning_count().to_string().yellow()
    );

    for (key, entry) in summary {
        if let Some(ref error) = entry.error {
            println!("  {} {}: {}", "✗".red(), key, error);
        } else if !entry.warnings.is_empty() {
            println!(
                "  {} {}: {} warnings",
                "!".yellow(),
                key,
                entry.warnings.len()
            );
        }
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let kind = detect_kind_from_path(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Kind".bold(), kind);

    match kind {
        DocumentKind::Parsed => {
            let parsed = reportmd::parse_file(input)?;
            let doc = &parsed.document;

            println!("{}: {}", "Document ID".bold(), doc.document_id);
            println!("{}: {}", "Pages".bold(), doc.page_count());
            println!("{}: {}", "Elements".bold(), doc.element_count());
            println!("{}: {}", "Tables".bold(), doc.table_count());

            if !parsed.anomalies.is_empty() {
                println!();
                println!("{}", "Warnings".yellow().bold());
                println!("{}", "─".repeat(40).dimmed());
                for warning in parsed.warnings() {
                    println!("  {}", warning);
                }
            }
        }
        DocumentKind::Merged => {
            let data = fs::read_to_string(input)?;
            let doc: MergedDocument = serde_json::from_str(&data)?;
            let tables = doc
                .pages
                .iter()
                .flat_map(|p| &p.elements)
                .filter(|e| matches!(e, MergedElement::Table(_)))
                .count();

            println!("{}: {}", "Document ID".bold(), doc.document_id);
            println!("{}: {}", "Pages".bold(), doc.page_count());
            println!("{}: {}", "Elements".bold(), doc.element_count());
            println!("{}: {}", "Tables".bold(), tables);
            println!("{}: {}", "Table rendering".bold(), doc.table_rendering);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "reportmd".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Parsed PDF report merge and Markdown export tool");
    println!();
    println!(
        "Table renderings: {}, {}, {}",
        TableRendering::Markdown,
        TableRendering::NaturalText,
        TableRendering::Both
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_merge_args_mapping() {
        let cli = Cli::parse_from([
            "reportmd",
            "merge",
            "-i",
            "in",
            "-o",
            "out",
            "--use-serialized-tables",
            "--strict",
            "--sequential",
            "--cleanup",
            "minimal",
        ]);

        let Commands::Merge { merge, .. } = cli.command else {
            panic!("expected merge command");
        };
        let options = merge.batch_options();
        assert!(!options.parallel);
        assert_eq!(options.merge.table_rendering, TableRendering::Both);
        assert!(options.merge.parse.is_strict());
        assert!(!options.merge.cleanup.remove_headers_footers);
    }

    #[test]
    fn test_run_writes_both_outputs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("a.json"),
            r#"{ "document_id": "a", "pages": [{ "page_number": 1, "elements": [] }] }"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "reportmd",
            "run",
            "-i",
            input.path().to_str().unwrap(),
            "-o",
            output.path().to_str().unwrap(),
        ]);
        let Commands::Run {
            input: i,
            output: o,
            merge,
            export,
        } = cli.command
        else {
            panic!("expected run command");
        };
        cmd_run(&i, &o, &merge, &export).unwrap();

        assert!(output.path().join("merged").join("a.json").exists());
        assert!(output.path().join("merged").join("processing_summary.json").exists());
        assert!(output.path().join("markdown").join("a.md").exists());
    }
}
