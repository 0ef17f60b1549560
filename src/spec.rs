//! The typed size specification.
//!
//! A [`SizeSpec`] is one declared target variant with every run-level default
//! already applied. It is built once per run by [`SizeSpec::build`], which
//! merges the task's [`RunOptions`] with the entry's [`SizeOverrides`],
//! validates the result, and resolves the display and output names. Nothing
//! downstream merges options again.

use crate::config::{RunOptions, SizeOverrides};
use crate::imaging::{EngineKind, Gravity, Quality, Sharpen};
use crate::naming::{display_name, output_name};
use crate::validate::{SpecValidationError, validate_custom_args, validate_quality, validate_size};
use serde::{Serialize, Serializer};
use std::fmt;

/// Identity of a valid spec within one run. Assigned sequentially, starting
/// at 0, in declaration order; invalid specs do not consume an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SpecId(pub usize);

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A requested edge length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Pixels(u32),
    /// Percentage of the natural edge (`50.0` means half).
    Percent(f64),
}

impl Dimension {
    pub fn is_percent(self) -> bool {
        matches!(self, Dimension::Percent(_))
    }

    /// Numeric part without its unit.
    pub fn value(self) -> f64 {
        match self {
            Dimension::Pixels(px) => px as f64,
            Dimension::Percent(pc) => pc,
        }
    }
}

/// `320` for pixels, `50%` for percentages.
impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{}", px),
            Dimension::Percent(pc) => write!(f, "{}%", pc),
        }
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One fully resolved target variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeSpec {
    pub id: SpecId,
    /// Display name: explicit, or derived from width/height.
    pub name: String,
    /// Appended to the source basename in non-templated destinations.
    pub output_name: String,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub quality: Quality,
    pub aspect_ratio: bool,
    pub upscale: bool,
    pub create_no_scaled_image: bool,
    pub gravity: Gravity,
    pub sample: bool,
    pub filter: Option<String>,
    pub sharpen: Option<Sharpen>,
    /// Output resolution in dpi.
    pub density: Option<u32>,
    pub custom_in: Vec<String>,
    pub custom_out: Vec<String>,
    pub prefix: String,
    pub suffix: String,
    pub separator: String,
    pub rename: bool,
    pub try_animated: bool,
    pub new_files_only: bool,
    pub engine: EngineKind,
}

impl SizeSpec {
    /// Merge defaults with one size entry, validate, and resolve names.
    pub fn build(
        id: SpecId,
        options: &RunOptions,
        size: &SizeOverrides,
    ) -> Result<Self, SpecValidationError> {
        let width_raw = size.width.as_ref().map(|w| w.as_text());
        let height_raw = size.height.as_ref().map(|h| h.as_text());
        let (width, height) = validate_size(width_raw.as_deref(), height_raw.as_deref())?;

        let quality = validate_quality(size.quality.unwrap_or(options.quality))?;

        let custom_in = size
            .custom_in
            .clone()
            .or_else(|| options.custom_in.clone())
            .map(|args| args.into_vec())
            .unwrap_or_default();
        let custom_out = size
            .custom_out
            .clone()
            .or_else(|| options.custom_out.clone())
            .map(|args| args.into_vec())
            .unwrap_or_default();
        validate_custom_args("custom_in", &custom_in)?;
        validate_custom_args("custom_out", &custom_out)?;

        let prefix = size.prefix.clone().unwrap_or_else(|| options.prefix.clone());
        let suffix = size.suffix.clone().unwrap_or_else(|| options.suffix.clone());
        let separator = size
            .separator
            .clone()
            .unwrap_or_else(|| options.separator.clone());
        let rename = size.rename.unwrap_or(options.rename);

        let name = display_name(size.name.as_deref(), width, height, &options.units);
        let output_name = output_name(&name, &format!("{prefix}{separator}"), &suffix, rename);

        Ok(Self {
            id,
            name,
            output_name,
            width,
            height,
            quality,
            aspect_ratio: size.aspect_ratio.unwrap_or(options.aspect_ratio),
            upscale: size.upscale.unwrap_or(options.upscale),
            create_no_scaled_image: size
                .create_no_scaled_image
                .unwrap_or(options.create_no_scaled_image),
            gravity: size.gravity.unwrap_or(options.gravity),
            sample: size.sample.unwrap_or(options.sample),
            filter: size.filter.clone().or_else(|| options.filter.clone()),
            sharpen: size.sharpen.or(options.sharpen),
            density: size.density.or(options.density).filter(|dpi| *dpi > 0),
            custom_in,
            custom_out,
            prefix,
            suffix,
            separator,
            rename,
            try_animated: size.try_animated.unwrap_or(options.try_animated),
            new_files_only: size.new_files_only.unwrap_or(options.new_files_only),
            engine: options.engine,
        })
    }

    /// Crop mode: aspect ratio disabled and both edges requested.
    pub fn is_crop(&self) -> bool {
        !self.aspect_ratio && self.width.is_some() && self.height.is_some()
    }
}
