//! Top-level conversion entry points.
//!
//! [`convert_images`] is the batch orchestrator: it walks the input list in
//! order, converts each file through [`crate::pipeline::raster`], catches
//! per-item failures at the item boundary, and returns every success plus a
//! failure report. [`convert_tabular`] is the single-file tabular path with
//! its two distinct failure points (read vs convert).
//!
//! Both are synchronous and purely functional: inputs in, results out, no
//! state kept between calls.

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::output::{BatchOutput, BatchStats, ConvertedFile, InputFile, ItemFailure};
use crate::pipeline::{raster, recipe, tabular};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a batch of image files to one shared target format.
///
/// Items are processed strictly in input order. A file that fails to decode
/// or encode is skipped and reported in [`BatchOutput::failures`]; the rest
/// of the batch continues (failure isolation).
///
/// # Returns
/// `Ok(BatchOutput)` whenever at least one file succeeded, even if others
/// failed (check `output.failures`).
///
/// # Errors
/// Returns `Err(ConvertError)` only for batch-fatal conditions:
/// - [`ConvertError::NoInput`] for an empty input list
/// - [`ConvertError::AllItemsFailed`] when no file converted at all
pub fn convert_images(
    items: &[InputFile],
    config: &ConvertConfig,
) -> Result<BatchOutput, ConvertError> {
    if items.is_empty() {
        return Err(ConvertError::NoInput);
    }

    let start = Instant::now();
    let total = items.len();
    info!("Starting image batch: {} files → {}", total, config.target);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut files: Vec<ConvertedFile> = Vec::with_capacity(total);
    let mut failures: Vec<ItemFailure> = Vec::new();
    let mut input_bytes: u64 = 0;

    for (index, item) in items.iter().enumerate() {
        input_bytes += item.bytes.len() as u64;
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &item.name);
        }

        let item_recipe = recipe::resolve_image(&item.name, config.target);
        debug!(
            "Item {}/{}: '{}' ({:?} → {})",
            index + 1,
            total,
            item.name,
            item_recipe.source,
            item_recipe.target
        );

        match raster::convert_raster(item, &item_recipe, config) {
            Ok(converted) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_complete(index, total, &item.name, converted.bytes.len());
                }
                files.push(converted);
            }
            Err(error) => {
                warn!("Skipping '{}': {}", item.name, error);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_error(index, total, &item.name, &error.to_string());
                }
                failures.push(ItemFailure {
                    original_name: item.name.clone(),
                    error,
                });
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, files.len());
    }

    if files.is_empty() {
        let first_error = failures
            .first()
            .map(|f| f.error.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ConvertError::AllItemsFailed { total, first_error });
    }

    let stats = BatchStats {
        total_items: total,
        succeeded: files.len(),
        failed: failures.len(),
        total_input_bytes: input_bytes,
        total_output_bytes: files.iter().map(|f| f.bytes.len() as u64).sum(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} files in {}ms",
        stats.succeeded, total, stats.duration_ms
    );

    Ok(BatchOutput {
        files,
        failures,
        stats,
    })
}

/// Convert one tabular file in its fixed direction: CSV to a single-sheet
/// workbook, or a workbook (`xlsx`/`xls`) to BOM-prefixed UTF-8 CSV.
///
/// # Errors
/// - [`ConvertError::ReadFailed`] when decoding or parsing the input fails
///   (the CSV encoding chain exhausted, or a malformed workbook)
/// - [`ConvertError::ConvertFailed`] when re-encoding fails after a
///   successful read
pub fn convert_tabular(item: &InputFile) -> Result<ConvertedFile, ConvertError> {
    let start = Instant::now();
    let item_recipe = recipe::resolve_tabular(&item.name);
    info!("Converting '{}' ({:?})", item.name, item_recipe);

    let table = tabular::read_table(item, item_recipe)?;
    debug!(
        "Read '{}': {} rows × {} columns",
        item.name,
        table.row_count(),
        table.column_count()
    );

    let bytes = tabular::encode_table(&table, item_recipe, &item.name)?;

    info!(
        "Converted '{}' in {}ms",
        item.name,
        start.elapsed().as_millis()
    );

    Ok(ConvertedFile {
        name: item_recipe.output_name(&item.name),
        bytes,
        content_type: item_recipe.content_type().to_string(),
    })
}
