//! Process command - extract metrics from a single report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use medscan_core::models::config::MedscanConfig;
use medscan_core::{DocumentProcessor, DocumentReport, MetricSet};

use super::{load_config, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Declared content type (default: inferred from the file extension)
    #[arg(long)]
    content_type: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_model_dir(&mut config, args.model_dir.clone());

    let document = read_document(&args.input, args.content_type.as_deref())?;
    info!("Processing file: {}", args.input.display());

    let processor = DocumentProcessor::from_config(&config);
    let processed = match processor.process(&document) {
        Ok(processed) => processed,
        Err(e) => {
            warn!("Failed to process {}: {}", document.name(), e);
            anyhow::bail!("{}", e.user_message());
        }
    };

    let report = DocumentReport {
        name: document.name().to_string(),
        index: 0,
        uploaded_at: document.submitted_at(),
        analyzed_at: Utc::now(),
        extraction: processed.extraction,
        metrics: processed.metrics,
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => format_report_text(&report),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Override the configured model directory.
pub fn apply_model_dir(config: &mut MedscanConfig, model_dir: Option<PathBuf>) {
    if let Some(dir) = model_dir {
        config.models.model_dir = dir;
    }
}

fn format_report_text(report: &DocumentReport) -> String {
    let mut lines = vec![
        format!("Document:   {}", report.name),
        format!(
            "Extraction: {} ({} characters)",
            report.extraction.method,
            report.extraction.text_length()
        ),
    ];
    if let Some(pages) = report.extraction.page_count {
        lines.push(format!("Pages:      {}", pages));
    }
    lines.push(String::new());
    lines.extend(format_metrics(&report.metrics));
    lines.join("\n")
}

/// One line per metric, with a dash for absent values.
pub fn format_metrics(metrics: &MetricSet) -> Vec<String> {
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    vec![
        format!(
            "Blood pressure: {}",
            or_dash(metrics.blood_pressure.map(|bp| bp.to_string()))
        ),
        format!("Glucose:        {}", or_dash(metrics.glucose.map(|v| v.to_string()))),
        format!("Cholesterol:    {}", or_dash(metrics.cholesterol.map(|v| v.to_string()))),
        format!("TSH:            {}", or_dash(metrics.thyroid_tsh.map(|v| v.to_string()))),
    ]
}
