//! # omniconv
//!
//! Convert image and tabular files between formats, entirely in memory.
//!
//! ## Why this crate?
//!
//! File-conversion sites keep resurrecting the same small pipeline: take a
//! set of uploaded blobs, re-encode each one, and hand back a download.
//! This crate is that pipeline as a library — no temp files, no state, no
//! I/O of its own — so a web handler, a desktop app, or the bundled CLI can
//! all drive the identical code path.
//!
//! ## Pipeline Overview
//!
//! ```text
//! uploads
//!  │
//!  ├─ 1. Recipe   resolve extension + requested target per file
//!  ├─ 2. Convert  images: decode → flatten alpha → re-encode
//!  │              tabular: csv ↔ xlsx with an ordered encoding chain
//!  ├─ 3. Collect  per-item failures are isolated, successes kept in order
//!  └─ 4. Package  one success → raw blob; several → deflate zip
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use omniconv::{convert_images, package_batch, ConvertConfig, ImageTarget, InputFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let items = vec![
//!         InputFile::new("photo.png", std::fs::read("photo.png")?),
//!         InputFile::new("logo.webp", std::fs::read("logo.webp")?),
//!     ];
//!
//!     let config = ConvertConfig::for_target(ImageTarget::Jpg);
//!     let batch = convert_images(&items, &config)?;
//!     for failure in &batch.failures {
//!         eprintln!("skipped: {}", failure.error);
//!     }
//!
//!     let package = package_batch(batch.files)?;
//!     let file = package.into_file();
//!     std::fs::write(&file.name, &file.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `omniconv` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! omniconv = { version = "0.3", default-features = false }
//! ```
//!
//! ## Supported Conversions
//!
//! | Domain  | Inputs                  | Targets |
//! |---------|-------------------------|---------|
//! | Images  | png, jpg, jpeg, webp    | PNG, JPG/JPEG (quality 95), WEBP |
//! | Tabular | csv, xlsx, xls          | fixed: csv → xlsx, xlsx/xls → csv (UTF-8 + BOM) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConvertConfig, ConvertConfigBuilder, DEFAULT_FLATTEN_BACKGROUND, DEFAULT_JPEG_QUALITY};
pub use convert::{convert_images, convert_tabular};
pub use error::{ConvertError, ItemError};
pub use output::{BatchOutput, BatchStats, ConvertedFile, InputFile, ItemFailure, Package};
pub use pipeline::package::{package_batch, ZIP_CONTENT_TYPE};
pub use pipeline::recipe::{
    file_extension, file_stem, ImageTarget, RasterFormat, TabularRecipe, CSV_CONTENT_TYPE,
    XLSX_CONTENT_TYPE,
};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
