//! Subcommands and the helpers they share.

pub mod analyze;
pub mod config;
pub mod parse;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use medscan_core::SubmittedDocument;
use medscan_core::models::config::MedscanConfig;

/// Location used when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("medscan")
        .join("config.json")
}

/// Resolve the configuration file: the explicit path, otherwise the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; a missing default file
/// falls back to built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<MedscanConfig> {
    if let Some(path) = explicit {
        return MedscanConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(MedscanConfig::from_file(&path)?)
    } else {
        Ok(MedscanConfig::default())
    }
}

/// Read a file into a document, inferring the content type from its extension
/// unless one is given.
pub fn read_document(path: &Path, content_type: Option<&str>) -> anyhow::Result<SubmittedDocument> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = match content_type {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();

    debug!("Read {} ({}, {} bytes)", name, content_type, content.len());
    Ok(SubmittedDocument::new(name, content_type, content))
}
