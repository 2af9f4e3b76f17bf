//! Packaging: one success passes through, several become a ZIP archive.
//!
//! The archive is plain deflate with no extra metadata. Entry names are the
//! computed output names exactly as the batch produced them; duplicate
//! names are written as duplicate entries and left for the reader's
//! last-entry-wins behaviour to resolve, matching what the batch loop
//! promises (no orchestrator-side deduplication).

use crate::error::ConvertError;
use crate::output::{ConvertedFile, Package};
use chrono::{DateTime, Local};
use std::io::{Cursor, Write};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Content type of the multi-file deliverable.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Decide the delivery shape for a batch's successes.
///
/// # Returns
/// * one success — [`Package::Single`] passing the blob through untouched
/// * two or more — [`Package::Archive`] with one entry per success
///
/// # Errors
/// [`ConvertError::NothingToPackage`] when the list is empty; callers must
/// surface a "nothing succeeded" state rather than offer an empty download.
pub fn package_batch(files: Vec<ConvertedFile>) -> Result<Package, ConvertError> {
    match files.len() {
        0 => Err(ConvertError::NothingToPackage),
        1 => {
            let file = files.into_iter().next().expect("len checked above");
            debug!("Packaging single file '{}'", file.name);
            Ok(Package::Single(file))
        }
        n => {
            let name = archive_name(&Local::now());
            info!("Packaging {} files into '{}'", n, name);
            let bytes = build_archive(&files)?;
            Ok(Package::Archive(ConvertedFile {
                name,
                bytes,
                content_type: ZIP_CONTENT_TYPE.to_string(),
            }))
        }
    }
}

/// `converted_images_<YYYYMMDD_HHMMSS>.zip`, stamped with the wall-clock
/// time packaging happens.
fn archive_name(now: &DateTime<Local>) -> String {
    format!("converted_images_{}.zip", now.format("%Y%m%d_%H%M%S"))
}

/// Deflate-compress every file into a single in-memory archive.
fn build_archive(files: &[ConvertedFile]) -> Result<Vec<u8>, ConvertError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        writer
            .start_file(file.name.as_str(), options)
            .map_err(|e| ConvertError::ArchiveFailed {
                detail: format!("'{}': {}", file.name, e),
            })?;
        writer
            .write_all(&file.bytes)
            .map_err(|e| ConvertError::ArchiveFailed {
                detail: format!("'{}': {}", file.name, e),
            })?;
    }

    let cursor = writer.finish().map_err(|e| ConvertError::ArchiveFailed {
        detail: e.to_string(),
    })?;
    Ok(cursor.into_inner())
}
