//! The export driver: marker discovery, per-record document or container
//! export, collision-free naming, progress reporting.

use std::path::PathBuf;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::{DiagnosticSink, LogSink, NoopSink};
use crate::formats::mcstructure::{export_container, ChunkContainerFormat};
use crate::formats::template::{build_document, ScanOptions};
use crate::marker::find_marker_blocks;
use crate::utils::{parse_bedrock_version, safe_filename, split_export_prefix, strip_namespace, unique_path};
use crate::world::{ChunkLoadError, Selection, WorldSource};

/// Default target platform version for container exports.
pub const DEFAULT_BEDROCK_VERSION: (i32, i32, i32) = (1, 21, 132);

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("nbt serialization error: {0}")]
    Nbt(#[from] quartz_nbt::io::NbtIoError),
    #[error(transparent)]
    ChunkLoad(#[from] ChunkLoadError),
    #[error("container encoder error: {0}")]
    Encoder(String),
    #[error("invalid structure document: {0}")]
    InvalidDocument(String),
}

/// Output format. Free-text selectors normalize here; anything
/// unrecognized falls back to the container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    McStructure,
    Nbt,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "nbt" => ExportFormat::Nbt,
            _ => ExportFormat::McStructure,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::McStructure => "mcstructure",
            ExportFormat::Nbt => "nbt",
        }
    }
}

/// Exporter configuration. All coercion is lenient: bad version strings and
/// unknown formats normalize to defaults, never error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Output path prefix; the directory part receives the files. Empty
    /// means the current directory.
    pub export_prefix: String,
    /// Include free-floating entities in the output.
    pub include_entities: bool,
    /// Emit size-only placeholder documents (tree format only).
    pub remove_blocks: bool,
    pub format: ExportFormat,
    /// Target platform version for container exports, free text.
    pub bedrock_version: String,
    /// Route marker-scan diagnostics to the log.
    pub debug: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            export_prefix: String::new(),
            include_entities: true,
            remove_blocks: false,
            format: ExportFormat::McStructure,
            bedrock_version: "1.21.132".to_string(),
            debug: false,
        }
    }
}

/// What an export run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    pub total: usize,
    pub exported: usize,
    pub failed: usize,
    pub paths: Vec<PathBuf>,
}

/// Export every resolved marker in `selection`, one file per marker.
///
/// Per-record failures are logged and counted, never fatal: a bad record
/// does not stop the run. `progress` is called with `completed / total`
/// after every record, climbing monotonically to 1.0. Only conditions
/// outside the per-record scope (creating the output directory) propagate.
pub fn export_structures(
    world: &dyn WorldSource,
    dimension: &str,
    selection: &Selection,
    container: &dyn ChunkContainerFormat,
    options: &ExportOptions,
    progress: &mut dyn FnMut(f64),
) -> Result<ExportSummary, ExportError> {
    let (out_dir, _base_prefix) = split_export_prefix(&options.export_prefix);
    std::fs::create_dir_all(&out_dir)?;

    let mut sink: Box<dyn DiagnosticSink> = if options.debug {
        Box::new(LogSink)
    } else {
        Box::new(NoopSink)
    };
    let records = find_marker_blocks(world, dimension, selection, sink.as_mut());

    if records.is_empty() {
        warn!("no structure blocks with valid name/size found inside selection");
        return Ok(ExportSummary::default());
    }

    let total = records.len();
    let version =
        parse_bedrock_version(&options.bedrock_version).unwrap_or(DEFAULT_BEDROCK_VERSION);
    info!(
        "exporting {} structure(s) to {:?} as {}",
        total,
        out_dir,
        options.format.extension()
    );

    let mut summary = ExportSummary {
        total,
        ..ExportSummary::default()
    };

    for (i, record) in records.iter().enumerate() {
        let bounds = record.target_box();
        let safe = safe_filename(strip_namespace(&record.identifier));
        let path = unique_path(
            &out_dir,
            &format!("{}.{}", safe, options.format.extension()),
        );

        let result = match options.format {
            ExportFormat::McStructure => export_container(
                world,
                dimension,
                &bounds,
                &path,
                version,
                options.include_entities,
                container,
            ),
            ExportFormat::Nbt => build_document(
                world,
                dimension,
                &bounds,
                ScanOptions {
                    remove_blocks: options.remove_blocks,
                    include_entities: options.include_entities,
                },
            )
            .and_then(|document| document.save(&path)),
        };

        match result {
            Ok(()) => {
                info!("[{}/{}] exported {:?}", i + 1, total, path);
                summary.exported += 1;
                summary.paths.push(path);
            }
            Err(e) => {
                error!(
                    "[{}/{}] failed to export '{}' at {:?}: {}",
                    i + 1,
                    total,
                    record.identifier,
                    record.position,
                    e
                );
                summary.failed += 1;
            }
        }

        progress((i + 1) as f64 / total as f64);
    }

    info!(
        "export finished: {} succeeded, {} failed",
        summary.exported, summary.failed
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing_falls_back() {
        assert_eq!(ExportFormat::parse("nbt"), ExportFormat::Nbt);
        assert_eq!(ExportFormat::parse("  NBT "), ExportFormat::Nbt);
        assert_eq!(ExportFormat::parse("mcstructure"), ExportFormat::McStructure);
        assert_eq!(ExportFormat::parse("schematic"), ExportFormat::McStructure);
        assert_eq!(ExportFormat::parse(""), ExportFormat::McStructure);
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert!(options.include_entities);
        assert!(!options.remove_blocks);
        assert!(!options.debug);
        assert_eq!(options.format, ExportFormat::McStructure);
        assert_eq!(
            parse_bedrock_version(&options.bedrock_version),
            Some(DEFAULT_BEDROCK_VERSION)
        );
    }
}
