// output/mod.rs
mod csv;
mod json;
mod xlsx;

use crate::domain::Listing;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX export failed: {0}")]
    Xlsx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Xlsx,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            "xlsx" => Some(OutputFormat::Xlsx),
            _ => None,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Csv => "listings.csv",
            OutputFormat::Json => "listings.json",
            OutputFormat::Xlsx => "listings.xlsx",
        }
    }

    fn render(self, listings: &[Listing]) -> Result<Vec<u8>, SinkError> {
        match self {
            OutputFormat::Csv => Ok(csv::to_bytes(listings)),
            OutputFormat::Json => json::to_bytes(listings),
            OutputFormat::Xlsx => xlsx::to_bytes(listings),
        }
    }
}

pub fn ensure_dir(path: &Path) -> Result<(), SinkError> {
    fs::create_dir_all(path).map_err(|source| SinkError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `bytes` next to `path` first and renames it into place, so a
/// failed write never leaves a half-written file behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SinkError> {
    let write_err = |source| SinkError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Saves every listing once per recognised format. Unknown format names are
/// skipped with a warning; an empty set still produces header-only files.
pub fn save(listings: &[Listing], output_dir: &Path, formats: &[String]) -> Result<Vec<PathBuf>, SinkError> {
    ensure_dir(output_dir)?;

    if listings.is_empty() {
        warn!("⚠️ No listings were scraped; writing empty output");
    }

    let mut done: Vec<OutputFormat> = Vec::new();
    let mut written = Vec::new();

    for name in formats {
        let Some(format) = OutputFormat::parse(name) else {
            warn!("⚠️ Unsupported output format '{name}', skipping");
            continue;
        };
        if done.contains(&format) {
            continue;
        }
        done.push(format);

        let bytes = format.render(listings)?;
        let path = output_dir.join(format.file_name());
        write_atomic(&path, &bytes)?;
        info!("💾 Data saved to {} ({} rows)", path.display(), listings.len());
        written.push(path);
    }

    Ok(written)
}
