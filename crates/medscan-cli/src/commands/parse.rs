//! Parse command - extract the text of a single PDF.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use medscan_core::pdf::{FILE_FIELD, ParseRequest, PdfTextExtractor, handle_parse};

use super::{load_config, read_document};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Form field name the file is submitted under
    #[arg(long, default_value = FILE_FIELD)]
    field: String,

    /// Declared content type (default: inferred from the file extension)
    #[arg(long)]
    content_type: Option<String>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let document = read_document(&args.input, args.content_type.as_deref())?;

    let request = ParseRequest::new(document).with_field_name(args.field);
    let extractor = PdfTextExtractor::from_config(&config);
    let response = handle_parse(&request, &extractor);

    info!("Parse finished with status {}", response.status());
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!("Parse failed with status {}", response.status());
    }

    Ok(())
}
