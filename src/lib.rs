//! Export marker-tagged sub-volumes of a voxel world as structure files.
//!
//! Structure marker blocks carry an identifier plus offset/size metadata in
//! their block-entity NBT. This crate scans a selection for such markers,
//! resolves their metadata with a fuzzy, revision-tolerant tree search, and
//! writes one file per marker: either a self-contained gzip-compressed NBT
//! document (palette, blocks, entities) or a chunked container produced by
//! an external encoder.

mod block_state;
mod bounding_box;
mod diagnostics;
mod document;
mod export;
mod formats;
mod locator;
mod marker;
mod palette;
mod utils;
mod world;

pub use block_state::BlockState;
pub use bounding_box::BoundingBox;
pub use diagnostics::{DiagnosticRecord, DiagnosticSink, LogSink, NoopSink, RecordingSink};
pub use document::{BlockEntry, EntityEntry, StructureDocument};
pub use export::{
    export_structures, ExportError, ExportFormat, ExportOptions, ExportSummary,
    DEFAULT_BEDROCK_VERSION,
};
pub use formats::mcstructure::{ChunkContainerEncoder, ChunkContainerFormat};
pub use formats::template::{build_document, ScanOptions};
pub use locator::{find_first_int, find_first_string, walk, TreeEntry};
pub use marker::{find_marker_blocks, parse_marker, MarkerRecord, MARKER_BLOCK};
pub use palette::Palette;
pub use utils::nbt::{NbtMap, NbtValue};
pub use utils::{
    parse_bedrock_version, safe_filename, split_export_prefix, strip_namespace, unique_path,
};
pub use world::{Chunk, ChunkLoadError, Selection, WorldSource};
