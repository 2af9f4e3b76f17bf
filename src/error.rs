//! Error types for the omniconv library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the operation cannot produce any output at
//!   all (unsupported target token, unreadable tabular file, every item in a
//!   batch failed, nothing to package). Returned as `Err(ConvertError)` from
//!   the top-level `convert_*` functions.
//!
//! * [`ItemError`] — **Non-fatal**: a single file in an image batch failed
//!   (corrupt bytes, unsupported mode for the target codec) but the other
//!   files are fine. Stored inside [`crate::output::ItemFailure`] so callers
//!   can inspect partial success rather than losing the whole batch to one
//!   bad upload.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! failed file, log and continue, or collect all failures for a post-run
//! report.

use thiserror::Error;

/// All fatal errors returned by the omniconv library.
///
/// Per-item failures in image batches use [`ItemError`] and are stored in
/// [`crate::output::ItemFailure`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The requested image target token is not one we encode.
    #[error("Unsupported target format '{token}'\nSupported targets: PNG, JPG, JPEG, WEBP.")]
    UnsupportedTarget { token: String },

    /// The batch was called with an empty input list.
    #[error("No input files provided")]
    NoInput,

    // ── Tabular errors ────────────────────────────────────────────────────
    /// The tabular file could not be read: the CSV decode chain was
    /// exhausted, the CSV was malformed, or the workbook failed to parse.
    #[error("Could not read file '{name}': {detail}\nCheck that it is a valid CSV or Excel file.")]
    ReadFailed { name: String, detail: String },

    /// The tabular file was read but re-encoding to the target format failed.
    #[error("Could not convert file '{name}': {detail}")]
    ConvertFailed { name: String, detail: String },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// Every file in the batch failed; there is no output to deliver.
    #[error("All {total} files failed to convert.\nFirst error: {first_error}")]
    AllItemsFailed { total: usize, first_error: String },

    /// The packager was handed an empty success list.
    ///
    /// Returned by [`crate::pipeline::package::package_batch`] so callers
    /// surface a "nothing succeeded" state instead of a zero-byte download.
    #[error("Nothing to package: the batch produced no successful conversions")]
    NothingToPackage,

    /// Writing the ZIP archive failed.
    #[error("Failed to build ZIP archive: {detail}")]
    ArchiveFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file in an image batch.
///
/// Stored alongside [`crate::output::ItemFailure`] when a file fails.
/// The overall batch continues unless ALL files fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// The uploaded bytes could not be decoded as an image.
    #[error("'{name}': could not decode image: {detail}")]
    DecodeFailed { name: String, detail: String },

    /// The decoded image could not be re-encoded to the target format.
    #[error("'{name}': could not encode as {target}: {detail}")]
    EncodeFailed {
        name: String,
        target: String,
        detail: String,
    },
}

impl ItemError {
    /// The original file name the failure belongs to.
    pub fn name(&self) -> &str {
        match self {
            ItemError::DecodeFailed { name, .. } => name,
            ItemError::EncodeFailed { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_items_failed_display() {
        let e = ConvertError::AllItemsFailed {
            total: 4,
            first_error: "bad magic".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 4 files"), "got: {msg}");
        assert!(msg.contains("bad magic"));
    }

    #[test]
    fn read_failed_display_names_file() {
        let e = ConvertError::ReadFailed {
            name: "data.csv".into(),
            detail: "no decodable encoding".into(),
        };
        assert!(e.to_string().contains("Could not read file 'data.csv'"));
    }

    #[test]
    fn convert_failed_is_distinct_from_read_failed() {
        let read = ConvertError::ReadFailed {
            name: "a.xlsx".into(),
            detail: "x".into(),
        };
        let conv = ConvertError::ConvertFailed {
            name: "a.xlsx".into(),
            detail: "x".into(),
        };
        assert!(read.to_string().starts_with("Could not read"));
        assert!(conv.to_string().starts_with("Could not convert"));
    }

    #[test]
    fn item_error_carries_original_name() {
        let e = ItemError::DecodeFailed {
            name: "photo.png".into(),
            detail: "truncated".into(),
        };
        assert_eq!(e.name(), "photo.png");
        assert!(e.to_string().contains("photo.png"));
    }

    #[test]
    fn unsupported_target_display() {
        let e = ConvertError::UnsupportedTarget {
            token: "tiff".into(),
        };
        assert!(e.to_string().contains("'tiff'"));
    }
}
