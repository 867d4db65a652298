//! Format normalization for downloaded assets
//!
//! Raster images with transparency are composited onto an opaque white
//! background before JPEG encoding; SVG input is rasterized first and then
//! flattened the same way. If the target file already exists the encoder is
//! never invoked again.

use image::{DynamicImage, RgbImage, RgbaImage};
use reelforge_core::{ReelError, Result};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Target encoding for normalized output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// Opaque JPEG at a fixed quality factor
    Jpeg { quality: u8 },
    /// Lossless PNG, alpha preserved
    Png,
}

impl TargetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg { .. } => "jpg",
            TargetFormat::Png => "png",
        }
    }

    /// Build from the config output-format table
    pub fn from_name(name: &str, jpeg_quality: u8) -> Result<Self> {
        match name {
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg {
                quality: jpeg_quality,
            }),
            "png" => Ok(TargetFormat::Png),
            other => Err(ReelError::ConfigError(format!(
                "unknown image format '{}'; valid values: jpeg, png",
                other
            ))),
        }
    }
}

/// Convert a downloaded asset into the target format.
///
/// Returns the target path. Idempotent: an existing target short-circuits
/// without re-decoding or re-encoding anything.
pub fn normalize(input: &Path, target: &Path, format: TargetFormat) -> Result<PathBuf> {
    if target.exists() {
        return Ok(target.to_path_buf());
    }

    let is_svg = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    let img = if is_svg {
        DynamicImage::ImageRgba8(rasterize_svg(input)?)
    } else {
        image::open(input)
            .map_err(|e| ReelError::ConversionFailed(format!("Failed to decode {}: {}", input.display(), e)))?
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        TargetFormat::Jpeg { quality } => {
            let rgb = if img.color().has_alpha() {
                flatten_onto_white(&img.to_rgba8())
            } else {
                img.to_rgb8()
            };
            encode_jpeg(&rgb, target, quality)?;
        }
        TargetFormat::Png => {
            img.save_with_format(target, image::ImageFormat::Png)
                .map_err(|e| {
                    ReelError::ConversionFailed(format!(
                        "Failed to encode {}: {}",
                        target.display(),
                        e
                    ))
                })?;
        }
    }

    Ok(target.to_path_buf())
}

/// Composite an RGBA image onto an opaque white background, using the
/// alpha channel as the blend mask
fn flatten_onto_white(img: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u32;
        let blend = |c: u8| -> u8 { ((c as u32 * a + 255 * (255 - a)) / 255) as u8 };
        out.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

fn encode_jpeg(img: &RgbImage, target: &Path, quality: u8) -> Result<()> {
    let file = std::fs::File::create(target)?;
    let mut writer = BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
    DynamicImage::ImageRgb8(img.clone())
        .write_with_encoder(encoder)
        .map_err(|e| {
            ReelError::ConversionFailed(format!("Failed to encode {}: {}", target.display(), e))
        })
}

/// Rasterize an SVG document at its natural size
fn rasterize_svg(input: &Path) -> Result<RgbaImage> {
    let data = std::fs::read(input)?;
    let options = resvg::usvg::Options::default();
    let tree = resvg::usvg::Tree::from_data(&data, &options).map_err(|e| {
        ReelError::ConversionFailed(format!("Failed to parse {}: {}", input.display(), e))
    })?;

    let size = tree.size().to_int_size();
    let (width, height) = (size.width().max(1), size.height().max(1));
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        ReelError::ConversionFailed(format!("Invalid SVG dimensions {}x{}", width, height))
    })?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    // Round-trip through PNG so the image crate handles premultiplied alpha
    let png = pixmap.encode_png().map_err(|e| {
        ReelError::ConversionFailed(format!("Failed to encode rasterized SVG: {}", e))
    })?;
    let img = image::load_from_memory(&png).map_err(|e| {
        ReelError::ConversionFailed(format!("Failed to reload rasterized SVG: {}", e))
    })?;
    Ok(img.to_rgba8())
}
