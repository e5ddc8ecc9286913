//! Analyze command - process several reports as one request and aggregate metrics.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::SecondsFormat;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use medscan_core::{
    AnalysisReport, BatchAggregator, DocumentFailure, DocumentProcessor, ErrorKind,
    SubmittedDocument,
};

use super::process::{apply_model_dir, format_metrics};
use super::{load_config, read_document};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a per-document summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Maximum documents processed at once (0 = unlimited)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_model_dir(&mut config, args.model_dir.clone());
    if let Some(jobs) = args.jobs {
        config.batch.max_concurrent_documents = jobs;
    }

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(", "));
    }

    eprintln!(
        "{} Found {} files to analyze",
        style("ℹ").blue(),
        files.len()
    );

    let inputs = read_inputs(&files);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("Analyzing {} documents", inputs.documents.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let aggregator = BatchAggregator::new(Arc::new(DocumentProcessor::from_config(&config)))
        .with_max_concurrent(config.batch.max_concurrent_documents);
    let mut report = aggregator.run(inputs.documents).await;
    restore_file_positions(&mut report, &inputs.positions, inputs.unreadable);

    spinner.finish_and_clear();

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &json)?;
        eprintln!(
            "{} Report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", json);
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&report, start.elapsed());

    report.ensure_any_succeeded()?;
    Ok(())
}

/// Existing paths are taken as-is; anything else is treated as a glob pattern.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.insert(path.to_path_buf());
            continue;
        }

        for entry in glob(input)?.filter_map(|r| r.ok()) {
            if entry.is_file() {
                files.insert(entry);
            }
        }
    }

    debug!("Expanded {} inputs to {} files", inputs.len(), files.len());
    Ok(files.into_iter().collect())
}

/// Files that could be read, with their position in the input list, and a
/// failure record for every file that could not.
struct ReadInputs {
    documents: Vec<SubmittedDocument>,
    positions: Vec<usize>,
    unreadable: Vec<DocumentFailure>,
}

fn read_inputs(files: &[PathBuf]) -> ReadInputs {
    let mut inputs = ReadInputs {
        documents: Vec::with_capacity(files.len()),
        positions: Vec::with_capacity(files.len()),
        unreadable: Vec::new(),
    };

    for (index, path) in files.iter().enumerate() {
        match read_document(path, None) {
            Ok(doc) => {
                inputs.documents.push(doc);
                inputs.positions.push(index);
            }
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                inputs.unreadable.push(DocumentFailure {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string()),
                    index,
                    kind: ErrorKind::InvalidDocument,
                    message: format!("Failed to read file content: {:#}", e),
                });
            }
        }
    }

    inputs
}

/// The aggregator numbers documents by their position among the readable
/// files; map those back to positions in the input list and append the read
/// failures.
fn restore_file_positions(
    report: &mut AnalysisReport,
    positions: &[usize],
    unreadable: Vec<DocumentFailure>,
) {
    let position = |index: usize| positions.get(index).copied().unwrap_or(index);

    for doc in &mut report.documents {
        doc.index = position(doc.index);
    }
    for failure in &mut report.failures {
        failure.index = position(failure.index);
    }

    let sources = &mut report.aggregated.sources;
    for slot in [
        &mut sources.blood_pressure,
        &mut sources.glucose,
        &mut sources.cholesterol,
        &mut sources.thyroid_tsh,
    ] {
        if let Some(index) = slot {
            *index = position(*index);
        }
    }

    report.failures.extend(unreadable);
}

fn print_summary(report: &AnalysisReport, elapsed: Duration) {
    eprintln!();
    eprintln!(
        "{} Analyzed {} files in {:?}",
        style("✓").green(),
        report.submitted_count(),
        elapsed
    );
    eprintln!(
        "   {} successful, {} failed",
        style(report.documents.len()).green(),
        style(report.failures.len()).red()
    );

    eprintln!();
    for line in format_metrics(&report.aggregated.metrics) {
        eprintln!("   {}", line);
    }

    if !report.failures.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for failure in &report.failures {
            eprintln!("  - {}: {}", failure.name, failure.message);
        }
    }
}

fn write_summary(path: &Path, report: &AnalysisReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "index",
        "filename",
        "status",
        "method",
        "text_length",
        "bp_systolic",
        "bp_diastolic",
        "glucose",
        "cholesterol",
        "thyroid_tsh",
        "analyzed_at",
        "error",
    ])?;

    let opt = |v: Option<String>| v.unwrap_or_default();
    let mut rows: Vec<(usize, Vec<String>)> = Vec::with_capacity(report.submitted_count());

    for doc in &report.documents {
        let m = &doc.metrics;
        rows.push((
            doc.index,
            vec![
                doc.index.to_string(),
                doc.name.clone(),
                "success".to_string(),
                doc.extraction.method.to_string(),
                doc.extraction.text_length().to_string(),
                opt(m.systolic().map(|v| v.to_string())),
                opt(m.diastolic().map(|v| v.to_string())),
                opt(m.glucose.map(|v| v.to_string())),
                opt(m.cholesterol.map(|v| v.to_string())),
                opt(m.thyroid_tsh.map(|v| v.to_string())),
                doc.analyzed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                String::new(),
            ],
        ));
    }

    for failure in &report.failures {
        let mut row = vec![String::new(); 12];
        row[0] = failure.index.to_string();
        row[1] = failure.name.clone();
        row[2] = "error".to_string();
        row[11] = failure.message.clone();
        rows.push((failure.index, row));
    }

    rows.sort_by_key(|(index, _)| *index);
    for (_, row) in rows {
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
