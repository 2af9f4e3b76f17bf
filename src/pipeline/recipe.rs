//! Format normalisation: file names + requested targets → conversion recipes.
//!
//! A recipe is the small, fully-resolved description of one conversion:
//! where the bytes claim to come from, what codec to encode with, and
//! whether alpha must be flattened before a lossy encode. Resolving it up
//! front keeps the converters themselves free of any string handling.
//!
//! Extension handling is deliberately simple: the extension is the
//! substring after the *last* dot, lowercased, and the empty string when
//! there is no dot. The extension is only a hint for the tabular dispatch
//! and for logging; image decoding sniffs the actual bytes.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Extract the lowercased extension from a file name.
///
/// Returns the substring after the last `.`, or `""` when the name has no
/// dot at all.
pub fn file_extension(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Extract the stem (everything before the last `.`) from a file name.
///
/// A name without a dot is its own stem, so renaming never fails.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

// ── Image domain ─────────────────────────────────────────────────────────

/// Raster formats we accept as batch inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Webp,
}

impl RasterFormat {
    /// Infer the source format from a file extension, if recognised.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(RasterFormat::Png),
            "jpg" | "jpeg" => Some(RasterFormat::Jpeg),
            "webp" => Some(RasterFormat::Webp),
            _ => None,
        }
    }
}

/// The target format requested for an image batch.
///
/// `Jpg` and `Jpeg` are separate variants on purpose: both encode as JPEG,
/// but the output file extension and content type follow the token the user
/// actually asked for (`JPG` → `photo.jpg`, `JPEG` → `photo.jpeg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageTarget {
    #[default]
    Png,
    Jpg,
    Jpeg,
    Webp,
}

impl ImageTarget {
    /// The codec used for the actual encode. `Jpg` aliases to JPEG.
    pub fn encode_format(self) -> image::ImageFormat {
        match self {
            ImageTarget::Png => image::ImageFormat::Png,
            ImageTarget::Jpg | ImageTarget::Jpeg => image::ImageFormat::Jpeg,
            ImageTarget::Webp => image::ImageFormat::WebP,
        }
    }

    /// Lowercase of the originally requested token; used for output names.
    pub fn extension(self) -> &'static str {
        match self {
            ImageTarget::Png => "png",
            ImageTarget::Jpg => "jpg",
            ImageTarget::Jpeg => "jpeg",
            ImageTarget::Webp => "webp",
        }
    }

    /// Content type of delivered blobs, `image/<extension>`.
    pub fn content_type(self) -> String {
        format!("image/{}", self.extension())
    }

    /// True when the encode target cannot represent an alpha channel.
    pub fn is_opaque_only(self) -> bool {
        self.encode_format() == image::ImageFormat::Jpeg
    }
}

impl FromStr for ImageTarget {
    type Err = ConvertError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageTarget::Png),
            "jpg" => Ok(ImageTarget::Jpg),
            "jpeg" => Ok(ImageTarget::Jpeg),
            "webp" => Ok(ImageTarget::Webp),
            _ => Err(ConvertError::UnsupportedTarget {
                token: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A resolved image conversion: source hint, encode target, flatten flag.
#[derive(Debug, Clone)]
pub struct ImageRecipe {
    /// Format inferred from the input extension. Informational only —
    /// decoding sniffs the bytes, so a misnamed file still converts.
    pub source: Option<RasterFormat>,
    /// Requested target token.
    pub target: ImageTarget,
    /// The target cannot carry alpha; composite onto an opaque background
    /// before encoding when the decoded mode has an alpha channel.
    pub flatten_alpha: bool,
}

impl ImageRecipe {
    /// Output file name: original stem + lowercase requested extension.
    pub fn output_name(&self, original: &str) -> String {
        format!("{}.{}", file_stem(original), self.target.extension())
    }
}

/// Resolve a recipe for one image file under the batch-wide target.
pub fn resolve_image(name: &str, target: ImageTarget) -> ImageRecipe {
    ImageRecipe {
        source: RasterFormat::from_extension(&file_extension(name)),
        target,
        flatten_alpha: target.is_opaque_only(),
    }
}

// ── Tabular domain ───────────────────────────────────────────────────────

/// XLSX delivery content type.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// CSV delivery content type.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// The fixed tabular conversion directions. There is no user-selectable
/// target: CSV becomes a workbook, and any workbook (`xlsx`/`xls`) becomes
/// BOM-prefixed UTF-8 CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabularRecipe {
    CsvToWorkbook,
    WorkbookToCsv,
}

impl TabularRecipe {
    /// Extension of the produced file.
    pub fn extension(self) -> &'static str {
        match self {
            TabularRecipe::CsvToWorkbook => "xlsx",
            TabularRecipe::WorkbookToCsv => "csv",
        }
    }

    /// Content type of the produced file.
    pub fn content_type(self) -> &'static str {
        match self {
            TabularRecipe::CsvToWorkbook => XLSX_CONTENT_TYPE,
            TabularRecipe::WorkbookToCsv => CSV_CONTENT_TYPE,
        }
    }

    /// Output file name: original stem + the fixed target extension.
    pub fn output_name(self, original: &str) -> String {
        format!("{}.{}", file_stem(original), self.extension())
    }
}

/// Resolve the conversion direction for one tabular file.
///
/// Only a `csv` extension selects the CSV reader; everything else is
/// handed to the workbook reader, which rejects non-spreadsheet bytes.
pub fn resolve_tabular(name: &str) -> TabularRecipe {
    if file_extension(name) == "csv" {
        TabularRecipe::CsvToWorkbook
    } else {
        TabularRecipe::WorkbookToCsv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_last_segment() {
        assert_eq!(file_extension("photo.PNG"), "png");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("photo"), "");
        assert_eq!(file_extension(".hidden"), "hidden");
    }

    #[test]
    fn stem_never_fails_without_dot() {
        assert_eq!(file_stem("photo.PNG"), "photo");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem("photo"), "photo");
    }

    #[test]
    fn target_parses_case_insensitively() {
        assert_eq!("WEBP".parse::<ImageTarget>().unwrap(), ImageTarget::Webp);
        assert_eq!("png".parse::<ImageTarget>().unwrap(), ImageTarget::Png);
        assert_eq!("Jpg".parse::<ImageTarget>().unwrap(), ImageTarget::Jpg);
        assert_eq!("jpeg".parse::<ImageTarget>().unwrap(), ImageTarget::Jpeg);
        assert!("tiff".parse::<ImageTarget>().is_err());
    }

    #[test]
    fn jpg_and_jpeg_share_a_codec_but_not_an_extension() {
        assert_eq!(
            ImageTarget::Jpg.encode_format(),
            image::ImageFormat::Jpeg
        );
        assert_eq!(
            ImageTarget::Jpeg.encode_format(),
            image::ImageFormat::Jpeg
        );
        assert_eq!(ImageTarget::Jpg.extension(), "jpg");
        assert_eq!(ImageTarget::Jpeg.extension(), "jpeg");
        assert_eq!(ImageTarget::Jpg.content_type(), "image/jpg");
    }

    #[test]
    fn only_jpeg_targets_flatten() {
        assert!(resolve_image("a.png", ImageTarget::Jpg).flatten_alpha);
        assert!(resolve_image("a.png", ImageTarget::Jpeg).flatten_alpha);
        assert!(!resolve_image("a.png", ImageTarget::Png).flatten_alpha);
        assert!(!resolve_image("a.png", ImageTarget::Webp).flatten_alpha);
    }

    #[test]
    fn output_name_uses_requested_token() {
        let recipe = resolve_image("photo.PNG", ImageTarget::Webp);
        assert_eq!(recipe.output_name("photo.PNG"), "photo.webp");

        let recipe = resolve_image("photo", ImageTarget::Jpg);
        assert_eq!(recipe.output_name("photo"), "photo.jpg");
    }

    #[test]
    fn tabular_direction_is_fixed_by_extension() {
        assert_eq!(resolve_tabular("a.csv"), TabularRecipe::CsvToWorkbook);
        assert_eq!(resolve_tabular("a.CSV"), TabularRecipe::CsvToWorkbook);
        assert_eq!(resolve_tabular("a.xlsx"), TabularRecipe::WorkbookToCsv);
        assert_eq!(resolve_tabular("a.xls"), TabularRecipe::WorkbookToCsv);
    }

    #[test]
    fn tabular_output_names() {
        assert_eq!(
            TabularRecipe::CsvToWorkbook.output_name("report.csv"),
            "report.xlsx"
        );
        assert_eq!(
            TabularRecipe::WorkbookToCsv.output_name("report.xlsx"),
            "report.csv"
        );
    }

    #[test]
    fn source_format_inferred_from_extension() {
        assert_eq!(
            RasterFormat::from_extension("jpeg"),
            Some(RasterFormat::Jpeg)
        );
        assert_eq!(RasterFormat::from_extension("bmp"), None);
    }
}
