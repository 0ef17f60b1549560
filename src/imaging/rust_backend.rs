//! Pure Rust image engine with no external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `GifDecoder` frame walk |
//! | Natural size | `image::image_dimensions` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` (or the configured filter) |
//! | Sample | `DynamicImage::resize_exact` with `Nearest` |
//! | Crop | `DynamicImage::crop_imm` at the gravity offset |
//! | Sharpen | `DynamicImage::unsharpen`, sigma capped at `radius / 3` |
//! | Encode → JPEG | `JpegEncoder` with quality and dpi density |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) with quality |
//! | Encode → PNG/GIF/WebP/TIFF | `DynamicImage::save_with_format` |
//!
//! Custom engine arguments are opaque command-line flags and have no meaning
//! here; jobs carrying them are rejected.

use super::backend::{BackendError, Dimensions, EngineKind, ImageEngine, ImageInfo};
use super::calculations::{crop_offset, scaled_dimensions};
use super::params::{Operation, Sharpen, SizingMethod, TransformJob};
use image::codecs::gif::GifDecoder;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Pure Rust engine using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEngine;

impl RustEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn unsupported(what: impl Into<String>) -> BackendError {
    BackendError::Unsupported {
        engine: EngineKind::Rust,
        what: what.into(),
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::Avif => "AVIF".to_string(),
        other => format!("{other:?}").to_ascii_uppercase(),
    }
}

/// Count GIF frames and read the delay of the first one.
fn inspect_gif(path: &Path) -> Result<ImageInfo, BackendError> {
    let reader = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(reader).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to read GIF {}: {}", path.display(), e))
    })?;

    let mut scene_count = 0u32;
    let mut frame_delay = 0u32;
    for frame in decoder.into_frames() {
        let frame = frame.map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to decode GIF frame in {}: {}",
                path.display(),
                e
            ))
        })?;
        if scene_count == 0 {
            let (numer, denom) = frame.delay().numer_denom_ms();
            // Hundredths of a second, like the Magick `%T` escape
            frame_delay = numer / denom.max(1) / 10;
        }
        scene_count += 1;
    }

    Ok(ImageInfo {
        format: "GIF".to_string(),
        frame_delay,
        scene_count,
    })
}

/// Blur sigma for `unsharpen`. A non-zero radius bounds the kernel the way
/// `-sharpen RxS` does: the Gaussian is cut at three sigma, so sigma is capped
/// at `radius / 3`.
fn unsharpen_sigma(sharpen: Sharpen) -> f32 {
    if sharpen.radius > 0.0 {
        sharpen.sigma.min(sharpen.radius / 3.0)
    } else {
        sharpen.sigma
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn parse_filter(name: &str) -> Result<FilterType, BackendError> {
    let filter = match name.to_ascii_lowercase().as_str() {
        "point" | "nearest" | "box" => FilterType::Nearest,
        "triangle" | "bilinear" | "linear" => FilterType::Triangle,
        "catrom" | "catmullrom" | "cubic" | "bicubic" => FilterType::CatmullRom,
        "gaussian" => FilterType::Gaussian,
        "lanczos" | "lanczos3" => FilterType::Lanczos3,
        other => return Err(unsupported(format!("filter '{other}'"))),
    };
    Ok(filter)
}

fn scale(
    img: &DynamicImage,
    width: Option<u32>,
    height: Option<u32>,
    method: SizingMethod,
    filter: FilterType,
) -> DynamicImage {
    let (w, h) = scaled_dimensions((img.width(), img.height()), width, height, method);
    img.resize_exact(w, h, filter)
}

fn save_image(
    img: &DynamicImage,
    path: &Path,
    quality: u32,
    density: Option<u32>,
) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let encode_failed =
        |e: image::ImageError| BackendError::ProcessingFailed(format!("Encode failed: {}", e));

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let writer = std::io::BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(writer, quality as u8);
            if let Some(dpi) = density {
                encoder.set_pixel_density(PixelDensity::dpi(dpi.min(u16::MAX as u32) as u16));
            }
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_failed)
        }
        "avif" => {
            let writer = std::io::BufWriter::new(File::create(path)?);
            let encoder =
                image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 6, quality as u8);
            img.write_with_encoder(encoder).map_err(encode_failed)
        }
        "png" => img.save_with_format(path, ImageFormat::Png).map_err(encode_failed),
        "gif" => img.save_with_format(path, ImageFormat::Gif).map_err(encode_failed),
        "webp" => img.save_with_format(path, ImageFormat::WebP).map_err(encode_failed),
        "tif" | "tiff" => img.save_with_format(path, ImageFormat::Tiff).map_err(encode_failed),
        other => Err(unsupported(format!("output format '{}'", other))),
    }
}

impl ImageEngine for RustEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Rust
    }

    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let format = ImageReader::open(path)?
            .with_guessed_format()?
            .format()
            .ok_or_else(|| {
                BackendError::ProcessingFailed(format!(
                    "Unrecognised image format: {}",
                    path.display()
                ))
            })?;

        if format == ImageFormat::Gif {
            inspect_gif(path)
        } else {
            Ok(ImageInfo::still(&format_name(format)))
        }
    }

    fn natural_size(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn transform(&self, job: &TransformJob) -> Result<(), BackendError> {
        let mut img = load_image(&job.source)?;
        let mut filter = FilterType::Lanczos3;
        let mut density = None;

        for op in &job.operations {
            match op {
                Operation::InputArgs(_) | Operation::OutputArgs(_) => {
                    return Err(unsupported("custom engine arguments"));
                }
                Operation::Filter(name) => filter = parse_filter(name)?,
                Operation::Resize {
                    width,
                    height,
                    method,
                } => img = scale(&img, *width, *height, *method, filter),
                Operation::Sample {
                    width,
                    height,
                    method,
                } => img = scale(&img, *width, *height, *method, FilterType::Nearest),
                Operation::Crop {
                    width,
                    height,
                    gravity,
                } => {
                    let (x, y) =
                        crop_offset(*gravity, (img.width(), img.height()), (*width, *height));
                    img = img.crop_imm(x, y, (*width).min(img.width()), (*height).min(img.height()));
                }
                Operation::Sharpen(sharpen) => img = img.unsharpen(unsharpen_sigma(*sharpen), 0),
                Operation::Density(dpi) => density = Some(*dpi),
            }
        }

        debug!(
            output = %job.output.display(),
            width = img.width(),
            height = img.height(),
            "encoding derivative"
        );
        save_image(&img, &job.output, job.quality.value(), density)
    }
}
