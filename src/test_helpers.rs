//! Shared test utilities.
//!
//! - [`test_spec`]: a valid [`SizeSpec`] with no edges set and every option
//!   at its default, for tests that tweak one field at a time.
//! - [`create_test_jpeg`] / [`create_test_gif`]: synthetic images written
//!   with the `image` crate.

use crate::imaging::{EngineKind, Gravity, Quality};
use crate::spec::{SizeSpec, SpecId};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

// =========================================================================
// Specs
// =========================================================================

pub fn test_spec() -> SizeSpec {
    SizeSpec {
        id: SpecId(0),
        name: String::new(),
        output_name: String::new(),
        width: None,
        height: None,
        quality: Quality::default(),
        aspect_ratio: true,
        upscale: false,
        create_no_scaled_image: false,
        gravity: Gravity::Center,
        sample: false,
        filter: None,
        sharpen: None,
        density: None,
        custom_in: Vec::new(),
        custom_out: Vec::new(),
        prefix: String::new(),
        suffix: String::new(),
        separator: "-".to_string(),
        rename: true,
        try_animated: false,
        new_files_only: true,
        engine: EngineKind::Rust,
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
}

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Write a 16x16 looping GIF with `frames` solid-colour frames, 100ms each.
pub fn create_test_gif(path: &Path, frames: usize) {
    ensure_parent(path);
    let file = fs::File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite).unwrap();

    let frames = (0..frames).map(|i| {
        let shade = (i * 60 % 256) as u8;
        let buffer = RgbaImage::from_pixel(16, 16, Rgba([shade, 255 - shade, 0, 255]));
        Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1))
    });
    encoder.encode_frames(frames).unwrap();
}
