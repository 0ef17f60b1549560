//! Parameter types for image operations.
//!
//! These types describe *what* the engine must do, not *how*. The
//! [`planner`](super::planner) decides the operation list for a
//! (source, spec) pair and hands a [`TransformJob`] to an
//! [`ImageEngine`](super::backend::ImageEngine), which does the pixel work.
//! Keeping the list explicit lets a mock engine record exactly what would
//! have been run.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`Sharpen`]: Sharpening parameters (radius + sigma).
//! - [`Gravity`]: Crop anchor, one of the nine compass points or center.
//! - [`SizingMethod`]: How a resize treats the target box.
//! - [`Operation`]: One step of a transform, in engine order.
//! - [`TransformJob`]: Source, destination, ordered operations and quality.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Sharpening parameters.
///
/// - `radius`: Radius of the sharpening kernel (0 lets the engine pick)
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sharpen {
    pub radius: f32,
    pub sigma: f32,
}

/// Anchor used when cropping an over-filled image down to the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    /// Name as understood by GraphicsMagick/ImageMagick `-gravity`.
    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::NorthWest => "NorthWest",
            Gravity::North => "North",
            Gravity::NorthEast => "NorthEast",
            Gravity::West => "West",
            Gravity::Center => "Center",
            Gravity::East => "East",
            Gravity::SouthWest => "SouthWest",
            Gravity::South => "South",
            Gravity::SouthEast => "SouthEast",
        }
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses gravity names case-insensitively. Short compass forms (`N`, `SE`, …)
/// are accepted as well.
impl FromStr for Gravity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let gravity = match s.trim().to_ascii_lowercase().as_str() {
            "northwest" | "nw" => Gravity::NorthWest,
            "north" | "n" => Gravity::North,
            "northeast" | "ne" => Gravity::NorthEast,
            "west" | "w" => Gravity::West,
            "center" | "centre" | "c" => Gravity::Center,
            "east" | "e" => Gravity::East,
            "southwest" | "sw" => Gravity::SouthWest,
            "south" | "s" => Gravity::South,
            "southeast" | "se" => Gravity::SouthEast,
            _ => return Err(format!("unknown gravity '{s}'")),
        };
        Ok(gravity)
    }
}

impl Serialize for Gravity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Gravity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How a resize treats the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMethod {
    /// Fit inside the box, preserving aspect ratio.
    Fit,
    /// Cover the box, preserving aspect ratio. One edge may exceed the box.
    Fill,
    /// Match the box exactly, ignoring aspect ratio.
    Stretch,
}

impl SizingMethod {
    /// Geometry flag used by the Magick command line tools.
    pub fn geometry_flag(self) -> &'static str {
        match self {
            SizingMethod::Fit => "",
            SizingMethod::Fill => "^",
            SizingMethod::Stretch => "!",
        }
    }
}

/// One step of a transform, listed in the order the engine applies them.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Opaque engine arguments placed before the source.
    InputArgs(Vec<String>),
    /// Resampling filter for the following resize.
    Filter(String),
    Resize {
        width: Option<u32>,
        height: Option<u32>,
        method: SizingMethod,
    },
    /// Like `Resize`, with a cheaper nearest-neighbour algorithm.
    Sample {
        width: Option<u32>,
        height: Option<u32>,
        method: SizingMethod,
    },
    Crop {
        width: u32,
        height: u32,
        gravity: Gravity,
    },
    Sharpen(Sharpen),
    /// Output resolution in dots per inch.
    Density(u32),
    /// Opaque engine arguments placed after all other options.
    OutputArgs(Vec<String>),
}

/// Everything an engine needs to produce one output file.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub operations: Vec<Operation>,
    pub quality: Quality,
}
