//! Result types produced by the conversion pipelines.
//!
//! Ownership is linear: each stage hands its blob to the next and keeps no
//! reference. A [`BatchOutput`] owns every converted blob until the caller
//! packages or drops it; nothing is cached across calls.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};

/// One uploaded file, fully read into memory before conversion.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Original file name, extension included.
    pub name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// A successfully converted file, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    /// Output file name (original stem + target extension).
    pub name: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Content type for the download response.
    pub content_type: String,
}

/// One file that failed to convert, kept out of the success list but never
/// silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Name of the uploaded file that failed.
    pub original_name: String,
    /// What went wrong at the item boundary.
    pub error: ItemError,
}

/// Aggregate counters for one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Files the batch was asked to convert.
    pub total_items: usize,
    /// Files that converted cleanly.
    pub succeeded: usize,
    /// Files skipped because of a per-item failure.
    pub failed: usize,
    /// Sum of input blob sizes in bytes.
    pub total_input_bytes: u64,
    /// Sum of converted blob sizes in bytes.
    pub total_output_bytes: u64,
    /// Wall-clock duration of the whole batch.
    pub duration_ms: u64,
}

/// Everything a batch run produced.
///
/// `files` holds only the successes, in the order their inputs appeared;
/// failed items are reported through `failures` instead of leaving
/// placeholder gaps.
#[derive(Debug)]
pub struct BatchOutput {
    /// Converted files, input order preserved among successes.
    pub files: Vec<ConvertedFile>,
    /// Per-item failures, also in input order.
    pub failures: Vec<ItemFailure>,
    /// Counters and timing for the run.
    pub stats: BatchStats,
}

/// How a batch's successes are delivered.
#[derive(Debug)]
pub enum Package {
    /// Exactly one success: its bytes pass through untouched, with the
    /// item's own name and content type.
    Single(ConvertedFile),
    /// Two or more successes: one deflate ZIP archive holding all of them,
    /// named `converted_images_<timestamp>.zip`.
    Archive(ConvertedFile),
}

impl Package {
    /// The deliverable file, whichever shape it took.
    pub fn file(&self) -> &ConvertedFile {
        match self {
            Package::Single(f) | Package::Archive(f) => f,
        }
    }

    /// Consume the package, returning the deliverable file.
    pub fn into_file(self) -> ConvertedFile {
        match self {
            Package::Single(f) | Package::Archive(f) => f,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Package::Archive(_))
    }
}
