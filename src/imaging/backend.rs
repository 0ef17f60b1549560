//! Image engine trait and shared types.
//!
//! The [`ImageEngine`] trait is the narrow boundary between the derivative
//! pipeline and whatever does the pixel work: identify a file, read its
//! natural size, and run a [`TransformJob`] that ends in a written file.
//!
//! | Engine | Kind | Implementation |
//! |---|---|---|
//! | Built-in | [`EngineKind::Rust`] | [`RustEngine`](super::rust_backend::RustEngine), the `image` crate |
//! | GraphicsMagick | [`EngineKind::GraphicsMagick`] | [`MagickEngine`](super::magick_backend::MagickEngine), `gm convert` |
//! | ImageMagick | [`EngineKind::ImageMagick`] | [`MagickEngine`](super::magick_backend::MagickEngine), `convert` |
//!
//! The engine is chosen once per run from the task options and passed down
//! explicitly; nothing in the pipeline holds a global engine.

use super::magick_backend::MagickEngine;
use super::params::TransformJob;
use super::rust_backend::RustEngine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("{engine} could not be started: {reason}\n{hint}", hint = .engine.install_hint())]
    EngineUnavailable { engine: EngineKind, reason: String },
    #[error("Unsupported by the {engine} engine: {what}")]
    Unsupported { engine: EngineKind, what: String },
}

/// Which engine renders the derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum EngineKind {
    /// Built-in pure Rust engine.
    #[default]
    #[serde(rename = "rust")]
    #[value(name = "rust")]
    Rust,
    /// GraphicsMagick command line tools (`gm`).
    #[serde(rename = "gm", alias = "graphicsmagick")]
    #[value(name = "gm")]
    GraphicsMagick,
    /// ImageMagick command line tools (`convert`, `identify`).
    #[serde(rename = "im", alias = "imagemagick")]
    #[value(name = "im")]
    ImageMagick,
}

impl EngineKind {
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Rust => "built-in",
            EngineKind::GraphicsMagick => "GraphicsMagick",
            EngineKind::ImageMagick => "ImageMagick",
        }
    }

    /// Short code used in the task file (`rust`, `gm`, `im`).
    pub fn code(self) -> &'static str {
        match self {
            EngineKind::Rust => "rust",
            EngineKind::GraphicsMagick => "gm",
            EngineKind::ImageMagick => "im",
        }
    }

    /// Whether the engine can pass opaque `custom_in`/`custom_out` arguments.
    pub fn accepts_custom_args(self) -> bool {
        !matches!(self, EngineKind::Rust)
    }

    /// Remediation text shown when the engine cannot be reached.
    pub fn install_hint(self) -> String {
        let (brew, url, alternative) = match self {
            EngineKind::Rust => {
                return "The built-in engine needs no installation; this is a bug.".to_string();
            }
            EngineKind::GraphicsMagick => (
                "graphicsmagick",
                "http://www.graphicsmagick.org/download.html",
                EngineKind::ImageMagick,
            ),
            EngineKind::ImageMagick => (
                "imagemagick",
                "http://www.imagemagick.org/script/binary-releases.php",
                EngineKind::GraphicsMagick,
            ),
        };
        format!(
            "Please ensure {} is installed correctly.\n\
             `brew install {}` or see {} for more details.\n\
             Alternatively, set options.engine to '{}' to use {}, or '{}' for the built-in engine.",
            self.name(),
            brew,
            url,
            alternative.code(),
            alternative.name(),
            EngineKind::Rust.code(),
        )
    }

    /// Instantiate the engine.
    pub fn build(self) -> Box<dyn ImageEngine> {
        match self {
            EngineKind::Rust => Box::new(RustEngine::new()),
            EngineKind::GraphicsMagick => Box::new(MagickEngine::graphicsmagick()),
            EngineKind::ImageMagick => Box::new(MagickEngine::imagemagick()),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Natural size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of an identify operation.
///
/// - `format`: container format in upper case (`JPEG`, `GIF`, …)
/// - `frame_delay`: delay of the frames in hundredths of a second, 0 for stills
/// - `scene_count`: number of frames (scenes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: String,
    pub frame_delay: u32,
    pub scene_count: u32,
}

impl ImageInfo {
    pub fn still(format: &str) -> Self {
        Self {
            format: format.to_ascii_uppercase(),
            frame_delay: 0,
            scene_count: 1,
        }
    }

    /// An animated GIF carries a frame delay and more than one scene.
    /// GIF87 cannot animate, so other formats never count.
    pub fn is_animated(&self) -> bool {
        self.format.eq_ignore_ascii_case("GIF") && self.frame_delay > 0 && self.scene_count > 1
    }
}

/// Trait for image engines.
///
/// Engines must be `Sync`: a single instance is shared by every worker of the
/// run's thread pool.
pub trait ImageEngine: Sync {
    /// Which engine this is (used in error messages).
    fn kind(&self) -> EngineKind;

    /// Format and animation metadata.
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Natural width and height.
    fn natural_size(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Apply the job's operations in order and write the output file.
    fn transform(&self, job: &TransformJob) -> Result<(), BackendError>;
}
