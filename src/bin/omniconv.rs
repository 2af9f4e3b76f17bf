//! CLI binary for omniconv.
//!
//! A thin presentation layer over the library crate that maps CLI flags to
//! `ConvertConfig`, renders progress, and writes the delivered package to
//! disk. The pipeline itself never touches the filesystem.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use omniconv::{
    convert_images, convert_tabular, package_batch, BatchProgressCallback, ConvertConfig,
    ConvertedFile, ImageTarget, InputFile, ProgressCallback,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Presentation-layer lookup data ───────────────────────────────────────────

/// Static footer tips keyed by subcommand. Read-only display data owned by
/// the CLI; the pipeline never consults it.
static FOOTER_TIPS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "images",
            "All processing happens in memory; nothing touches disk until the final write.",
        ),
        (
            "table",
            "CSV output is UTF-8 with a BOM, so Excel opens non-ASCII text correctly.",
        ),
    ])
});

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and a per-file
/// log line as the batch loop works through the input list.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of files that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by
    /// `on_batch_start` (called before any file is converted).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_items: usize) {
        self.activate_bar(total_items);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_items} files…"))
        ));
    }

    fn on_item_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_item_complete(&self, index: usize, total: usize, name: &str, output_bytes: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(&format!("{output_bytes} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_items: usize, success_count: usize) {
        let failed = total_items.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_items {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_items,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a single image (output lands next to you, photo.webp)
  omniconv images --to webp photo.png

  # Batch conversion: several files become one zip archive
  omniconv images --to jpg shot1.png shot2.png shot3.webp -o out/

  # CSV to Excel
  omniconv table report.csv

  # Excel to CSV (UTF-8 with BOM)
  omniconv table report.xlsx -o exports/

  # Machine-readable batch stats
  omniconv images --to png --json scans/*.jpg

SUPPORTED FORMATS:
  Images   png, jpg, jpeg, webp   →  PNG | JPG | JPEG | WEBP
  Tabular  csv                    →  xlsx  (single sheet, no index column)
           xlsx, xls              →  csv   (UTF-8 with BOM)

NOTES:
  A batch with exactly one successful file downloads as that file; two or
  more successes are delivered as converted_images_<timestamp>.zip.
  A file that fails to convert is skipped and reported; it never aborts
  the rest of the batch.
"#;

/// Convert images and tabular files between formats, entirely in memory.
#[derive(Parser, Debug)]
#[command(
    name = "omniconv",
    version,
    about = "Convert images and tabular files between formats, entirely in memory",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory to write the delivered file into.
    #[arg(short, long, env = "OMNICONV_OUTPUT_DIR", default_value = ".", global = true)]
    output_dir: PathBuf,

    /// Print batch stats as JSON to stdout.
    #[arg(long, env = "OMNICONV_JSON", global = true)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "OMNICONV_NO_PROGRESS", global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OMNICONV_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OMNICONV_QUIET", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one or more images to a shared target format.
    Images {
        /// Image files to convert (png, jpg, jpeg, webp).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target format: png, jpg, jpeg, or webp.
        #[arg(long = "to", env = "OMNICONV_TARGET", default_value = "png")]
        target: String,

        /// JPEG encode quality (1-100).
        #[arg(long, env = "OMNICONV_JPEG_QUALITY", default_value_t = 95,
              value_parser = clap::value_parser!(u8).range(1..=100))]
        jpeg_quality: u8,
    },
    /// Convert a CSV file to XLSX, or an XLSX/XLS file to CSV.
    Table {
        /// The tabular file to convert (csv, xlsx, xls).
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Images {
            files,
            target,
            jpeg_quality,
        } => run_images(&cli, files, target, *jpeg_quality, show_progress),
        Command::Table { file } => run_table(&cli, file),
    }
}

fn run_images(
    cli: &Cli,
    files: &[PathBuf],
    target: &str,
    jpeg_quality: u8,
    show_progress: bool,
) -> Result<()> {
    let target: ImageTarget = target
        .parse()
        .with_context(|| format!("Invalid --to value '{target}'"))?;

    // ── Read every input fully into memory ───────────────────────────────
    let items: Vec<InputFile> = files
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(InputFile::new(file_name_of(path), bytes))
        })
        .collect::<Result<_>>()?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let mut builder = ConvertConfig::builder()
        .target(target)
        .jpeg_quality(jpeg_quality);
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion + packaging ───────────────────────────────────────
    let batch = convert_images(&items, &config).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&batch.stats).context("Failed to serialise stats")?
        );
    }

    if !show_progress && !cli.quiet {
        for failure in &batch.failures {
            eprintln!("{} {}", red("✗"), failure.error);
        }
    }

    let stats = batch.stats.clone();
    let package = package_batch(batch.files).context("Packaging failed")?;
    let path = write_delivered(package.file(), &cli.output_dir)?;

    if !cli.quiet {
        eprintln!(
            "{}  {}/{} files  {}ms  →  {}",
            if stats.failed == 0 { green("✔") } else { cyan("⚠") },
            stats.succeeded,
            stats.total_items,
            stats.duration_ms,
            bold(&path.display().to_string()),
        );
        if let Some(tip) = FOOTER_TIPS.get("images") {
            eprintln!("   {}", dim(tip));
        }
    }

    Ok(())
}

fn run_table(cli: &Cli, file: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let item = InputFile::new(file_name_of(file), bytes);

    let converted = convert_tabular(&item).context("Conversion failed")?;
    let path = write_delivered(&converted, &cli.output_dir)?;

    if !cli.quiet {
        eprintln!(
            "{}  {}  →  {}",
            green("✔"),
            item.name,
            bold(&path.display().to_string()),
        );
        if let Some(tip) = FOOTER_TIPS.get("table") {
            eprintln!("   {}", dim(tip));
        }
    }

    Ok(())
}

/// The file name component of a path, as uploaded names would appear.
fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write the delivered file into the output directory.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
fn write_delivered(file: &ConvertedFile, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let path = out_dir.join(&file.name);
    let tmp_path = path.with_extension("tmp");

    std::fs::write(&tmp_path, &file.bytes)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, &path)
        .with_context(|| format!("Failed to move output into place at {}", path.display()))?;

    Ok(path)
}
