//! Single-item image conversion: decode, normalise colour, re-encode.
//!
//! ## Why flatten onto a canvas instead of dropping alpha?
//!
//! JPEG has no alpha channel. Simply discarding alpha turns every
//! transparent pixel into whatever colour the RGB channels happen to hold
//! (usually black), which is never what the user sees on screen. Compositing
//! onto an opaque background with a linear per-pixel blend reproduces what a
//! browser would render, so the JPEG looks like the PNG it came from.
//!
//! Failures stay inside this module's `Result`: a corrupt upload produces an
//! [`ItemError`] carrying the original file name, never a panic, so the
//! batch loop can skip the file and keep going.

use crate::config::ConvertConfig;
use crate::error::ItemError;
use crate::output::{ConvertedFile, InputFile};
use crate::pipeline::recipe::ImageRecipe;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Convert one image blob according to its recipe.
///
/// # Returns
/// The re-encoded blob with its derived name and content type, or an
/// [`ItemError`] naming the failing file.
pub fn convert_raster(
    item: &InputFile,
    recipe: &ImageRecipe,
    config: &ConvertConfig,
) -> Result<ConvertedFile, ItemError> {
    // ── Step 1: Decode ───────────────────────────────────────────────────
    // Decoding sniffs the actual bytes; the file extension is only a hint,
    // so a JPEG named .png still converts.
    let img = image::load_from_memory(&item.bytes).map_err(|e| ItemError::DecodeFailed {
        name: item.name.clone(),
        detail: e.to_string(),
    })?;

    debug!(
        "Decoded '{}': {}x{} {:?}",
        item.name,
        img.width(),
        img.height(),
        img.color()
    );

    // ── Step 2/3: Normalise colour for the target codec ─────────────────
    let prepared = prepare_for_target(img, recipe, config);

    // ── Step 4: Encode ───────────────────────────────────────────────────
    let bytes = encode(&prepared, recipe.target.encode_format(), config.jpeg_quality).map_err(
        |e| ItemError::EncodeFailed {
            name: item.name.clone(),
            target: recipe.target.extension().to_string(),
            detail: e.to_string(),
        },
    )?;

    Ok(ConvertedFile {
        name: recipe.output_name(&item.name),
        bytes,
        content_type: recipe.target.content_type(),
    })
}

/// Convert the decoded image into a mode the target codec accepts.
///
/// JPEG targets: flatten alpha onto the configured background, or plain
/// RGB conversion when there is no alpha to blend. WEBP targets: the
/// encoder only accepts RGB8/RGBA8, so unusual decode modes (grayscale,
/// 16-bit) are normalised while keeping alpha. PNG targets keep the native
/// mode untouched.
fn prepare_for_target(
    img: DynamicImage,
    recipe: &ImageRecipe,
    config: &ConvertConfig,
) -> DynamicImage {
    if recipe.flatten_alpha {
        if img.color().has_alpha() {
            return DynamicImage::ImageRgb8(flatten_alpha(&img, config.flatten_background));
        }
        if img.color() != ColorType::Rgb8 {
            return DynamicImage::ImageRgb8(img.to_rgb8());
        }
        return img;
    }

    if recipe.target.encode_format() == ImageFormat::WebP
        && !matches!(img.color(), ColorType::Rgb8 | ColorType::Rgba8)
    {
        return if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };
    }

    img
}

/// Composite the image onto an opaque canvas, discarding alpha.
///
/// The canvas has the source's exact dimensions and is filled with
/// `background`. Each output channel is the linear blend
/// `(src * a + bg * (255 - a)) / 255`, rounded: fully transparent pixels
/// become the background, fully opaque pixels keep their source colour.
pub(crate) fn flatten_alpha(img: &DynamicImage, background: [u8; 3]) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut canvas = RgbImage::from_pixel(rgba.width(), rgba.height(), Rgb(background));

    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u32;
        let out = canvas.get_pixel_mut(x, y);
        for c in 0..3 {
            let src = px[c] as u32;
            let bg = background[c] as u32;
            out[c] = ((src * a + bg * (255 - a) + 127) / 255) as u8;
        }
    }

    canvas
}

/// Encode with the target codec. JPEG takes the quality knob; every other
/// codec runs with its defaults.
fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
            img.write_with_encoder(encoder)?;
        }
        _ => {
            img.write_to(&mut buf, format)?;
        }
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::recipe::{resolve_image, ImageTarget};
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn flatten_sends_transparent_pixels_to_background() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0])));
        let flat = flatten_alpha(&img, [255, 255, 255]);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn flatten_keeps_opaque_pixels() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])));
        let flat = flatten_alpha(&img, [255, 255, 255]);
        assert_eq!(flat.get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn flatten_blends_partial_alpha_linearly() {
        // Red at roughly half alpha over white: r stays 255, g/b land in
        // the middle of the ramp.
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 128])));
        let flat = flatten_alpha(&img, [255, 255, 255]);
        let px = flat.get_pixel(0, 0);
        assert_eq!(px[0], 255);
        assert_eq!(px[1], ((255u32 * 127 + 127) / 255) as u8);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn jpeg_output_is_three_channel() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 128, 255, 200])));
        let item = InputFile::new("img.png", png_bytes(&src));
        let recipe = resolve_image("img.png", ImageTarget::Jpg);
        let out = convert_raster(&item, &recipe, &ConvertConfig::default()).unwrap();

        assert_eq!(out.name, "img.jpg");
        assert_eq!(out.content_type, "image/jpg");
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn grayscale_to_jpeg_converts_to_rgb() {
        let src = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(8, 8, image::Luma([90])));
        let item = InputFile::new("gray.png", png_bytes(&src));
        let recipe = resolve_image("gray.png", ImageTarget::Jpeg);
        let out = convert_raster(&item, &recipe, &ConvertConfig::default()).unwrap();

        assert_eq!(out.name, "gray.jpeg");
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    #[test]
    fn png_target_keeps_alpha() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 100])));
        let item = InputFile::new("a.webp", {
            let mut buf = Cursor::new(Vec::new());
            src.write_to(&mut buf, ImageFormat::WebP).unwrap();
            buf.into_inner()
        });
        let recipe = resolve_image("a.webp", ImageTarget::Png);
        let out = convert_raster(&item, &recipe, &ConvertConfig::default()).unwrap();

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn grayscale_to_webp_is_normalised_for_the_encoder() {
        let src = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(5, 5, image::Luma([42])));
        let item = InputFile::new("gray.png", png_bytes(&src));
        let recipe = resolve_image("gray.png", ImageTarget::Webp);
        let out = convert_raster(&item, &recipe, &ConvertConfig::default()).unwrap();
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn garbage_bytes_fail_at_the_item_boundary() {
        let item = InputFile::new("noise.png", vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let recipe = resolve_image("noise.png", ImageTarget::Png);
        let err = convert_raster(&item, &recipe, &ConvertConfig::default()).unwrap_err();
        assert!(matches!(err, ItemError::DecodeFailed { .. }));
        assert_eq!(err.name(), "noise.png");
    }

    #[test]
    fn custom_background_is_used_for_flattening() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let flat = flatten_alpha(&src, [0, 128, 255]);
        assert_eq!(flat.get_pixel(1, 1), &Rgb([0, 128, 255]));
    }
}
