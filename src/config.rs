//! Task file configuration.
//!
//! A run is described by one TOML task file (`responsive-images.toml` by
//! default). Every key is optional; missing keys take the stock defaults and
//! unknown keys are rejected.
//!
//! ```toml
//! [options]                 # run-level defaults, overridable per size
//! engine = "rust"           # rust | gm | im (run-level only)
//! concurrency = 1           # transforms in flight at once (run-level only)
//! quality = 100
//!
//! [options.units]           # labels used to build names from sizes
//! percentage = "pc"
//! pixel = ""
//! multiply = "x"
//!
//! [[sizes]]                 # one entry per derivative
//! name = "small"
//! width = 320
//!
//! [[files]]                 # source groups
//! cwd = "images_src"
//! src = ["*.{gif,jpg,png}"]
//! dest = "images"
//! ```
//!
//! Relative paths are resolved against the directory holding the task file.
//! See [`stock_config_toml`] for the fully documented file printed by
//! `gen-config`.

use crate::imaging::{EngineKind, Gravity, Sharpen};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full task file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    pub options: RunOptions,
    pub sizes: Vec<SizeOverrides>,
    pub files: Vec<FileGroup>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            options: RunOptions::default(),
            sizes: default_sizes(),
            files: Vec::new(),
        }
    }
}

/// `small`/320, `medium`/640, `large`/1024.
pub fn default_sizes() -> Vec<SizeOverrides> {
    [("small", 320), ("medium", 640), ("large", 1024)]
        .into_iter()
        .map(|(name, width)| SizeOverrides {
            name: Some(name.to_string()),
            width: Some(RawDimension::Integer(width)),
            ..SizeOverrides::default()
        })
        .collect()
}

impl TaskConfig {
    /// Validate run-level settings. Individual sizes are validated when the
    /// run builds its specs, so one bad size does not reject the file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::Validation(
                "sizes must not be empty".into(),
            ));
        }
        if self.files.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[files]] group is required".into(),
            ));
        }
        if self.options.concurrency == 0 {
            return Err(ConfigError::Validation(
                "options.concurrency must be at least 1".into(),
            ));
        }
        for (index, group) in self.files.iter().enumerate() {
            if group.src.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "files[{index}].src must list at least one pattern"
                )));
            }
        }

        let engine = self.options.engine;
        if !engine.accepts_custom_args() {
            let global = self.options.custom_in.is_some() || self.options.custom_out.is_some();
            let per_size = self
                .sizes
                .iter()
                .any(|s| s.custom_in.is_some() || s.custom_out.is_some());
            if global || per_size {
                return Err(ConfigError::Validation(format!(
                    "custom_in/custom_out are engine arguments and need engine \"gm\" or \"im\", not \"{}\"",
                    engine.code()
                )));
            }
        }
        Ok(())
    }
}

/// Labels used when a size name is derived from its edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitLabels {
    pub percentage: String,
    pub pixel: String,
    pub multiply: String,
}

impl Default for UnitLabels {
    fn default() -> Self {
        Self {
            percentage: "pc".into(),
            pixel: String::new(),
            multiply: "x".into(),
        }
    }
}

/// Engine arguments given as one string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomArgs {
    One(String),
    Many(Vec<String>),
}

impl CustomArgs {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CustomArgs::One(arg) => vec![arg],
            CustomArgs::Many(args) => args,
        }
    }
}

/// A width or height as written in the task file: `320`, `"320px"`, `"50%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDimension {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawDimension {
    /// Textual form handed to the size validator.
    pub fn as_text(&self) -> String {
        match self {
            RawDimension::Integer(n) => n.to_string(),
            RawDimension::Float(f) => f.to_string(),
            RawDimension::Text(s) => s.clone(),
        }
    }
}

/// Run-level options. Everything except `engine`, `concurrency` and `units`
/// is a default that each size may override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunOptions {
    pub engine: EngineKind,
    pub concurrency: usize,
    pub units: UnitLabels,
    /// Any number; the range is checked per size during spec validation.
    pub quality: f64,
    pub aspect_ratio: bool,
    pub upscale: bool,
    pub create_no_scaled_image: bool,
    pub gravity: Gravity,
    /// Output dpi; 0 disables the density step.
    pub density: Option<u32>,
    pub new_files_only: bool,
    pub rename: bool,
    pub separator: String,
    pub prefix: String,
    pub suffix: String,
    pub try_animated: bool,
    pub sample: bool,
    pub filter: Option<String>,
    pub sharpen: Option<Sharpen>,
    pub custom_in: Option<CustomArgs>,
    pub custom_out: Option<CustomArgs>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            concurrency: 1,
            units: UnitLabels::default(),
            quality: 100.0,
            aspect_ratio: true,
            upscale: false,
            create_no_scaled_image: false,
            gravity: Gravity::Center,
            density: Some(72),
            new_files_only: true,
            rename: true,
            separator: "-".into(),
            prefix: String::new(),
            suffix: String::new(),
            try_animated: false,
            sample: false,
            filter: None,
            sharpen: None,
            custom_in: None,
            custom_out: None,
        }
    }
}

/// One `[[sizes]]` entry. Unset fields fall back to [`RunOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeOverrides {
    pub name: Option<String>,
    pub width: Option<RawDimension>,
    pub height: Option<RawDimension>,
    pub quality: Option<f64>,
    pub aspect_ratio: Option<bool>,
    pub upscale: Option<bool>,
    pub create_no_scaled_image: Option<bool>,
    pub gravity: Option<Gravity>,
    pub density: Option<u32>,
    pub new_files_only: Option<bool>,
    pub rename: Option<bool>,
    pub separator: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub try_animated: Option<bool>,
    pub sample: Option<bool>,
    pub filter: Option<String>,
    pub sharpen: Option<Sharpen>,
    pub custom_in: Option<CustomArgs>,
    pub custom_out: Option<CustomArgs>,
}

/// One `[[files]]` group: sources matched under `cwd`, mirrored under `dest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileGroup {
    pub cwd: String,
    pub src: Vec<String>,
    pub dest: String,
    /// Destination directory template with `{%= field %}` placeholders.
    pub custom_dest: Option<String>,
}

/// Parse task file contents without validating.
pub fn parse_config(content: &str) -> Result<TaskConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate a task file.
pub fn load_config(path: &Path) -> Result<TaskConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock task file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Responsive Images Task File
# ============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.
# Relative paths are resolved against the directory holding this file.

# ---------------------------------------------------------------------------
# Run options
# ---------------------------------------------------------------------------
# Every option except engine, concurrency and units can be overridden
# inside a [[sizes]] entry.
[options]
# Image engine: "rust" (built in), "gm" (GraphicsMagick) or "im" (ImageMagick).
engine = "rust"

# How many transforms may run at once.
concurrency = 1

# Encoding quality. Must be greater than 1 and at most 100.
quality = 100

# Keep the aspect ratio when both width and height are given.
# With aspect_ratio = false and both edges set, images are filled and then
# cropped at the gravity anchor.
aspect_ratio = true

# Allow output larger than the source.
upscale = false

# Produce nothing instead of a same-size copy when a size would upscale.
create_no_scaled_image = false

# Crop anchor: NorthWest, North, NorthEast, West, Center,
# East, SouthWest, South or SouthEast.
gravity = "Center"

# Output resolution in dpi. 0 leaves the density untouched.
density = 72

# Skip outputs that already exist.
new_files_only = true

# Append the size name to output filenames. With rename = false only the
# suffix is appended.
rename = true
separator = "-"
prefix = ""
suffix = ""

# Process animated GIFs instead of skipping them.
try_animated = false

# Use fast sampling instead of filtered resizing.
sample = false

# filter = "Lanczos"
# sharpen = { radius = 0.0, sigma = 1.0 }

# Raw engine arguments, gm/im only.
# custom_in = ["-interlace", "line"]
# custom_out = ["-strip"]

# Labels used when a size has no name: 640x480, 50pc.
[options.units]
percentage = "pc"
pixel = ""
multiply = "x"

# ---------------------------------------------------------------------------
# Sizes
# ---------------------------------------------------------------------------
# Width and height accept pixels (320, "320px") or percentages ("50%").
# Percentages and pixels cannot be mixed in one size.
[[sizes]]
name = "small"
width = 320

[[sizes]]
name = "medium"
width = 640

[[sizes]]
name = "large"
width = 1024

# ---------------------------------------------------------------------------
# Source files
# ---------------------------------------------------------------------------
# Patterns are matched against paths relative to cwd. `*` stays inside one
# directory, `**` crosses directories and {a,b} lists alternatives.
# [[files]]
# cwd = "images_src"
# src = ["**/*.{jpg,png,gif}"]
# dest = "images"
# custom_dest = "images/{%= width %}/{%= path %}"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn minimal(extra: &str) -> String {
        format!(
            r#"{extra}
[[files]]
cwd = "src"
src = ["*.jpg"]
dest = "out"
"#
        )
    }

    #[test]
    fn default_options_match_documented_values() {
        let options = RunOptions::default();
        assert_eq!(options.engine, EngineKind::Rust);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.quality, 100.0);
        assert!(options.aspect_ratio);
        assert!(!options.upscale);
        assert!(!options.create_no_scaled_image);
        assert_eq!(options.gravity, Gravity::Center);
        assert_eq!(options.density, Some(72));
        assert!(options.new_files_only);
        assert!(options.rename);
        assert_eq!(options.separator, "-");
        assert!(!options.try_animated);
        assert_eq!(options.units, UnitLabels::default());
    }

    #[test]
    fn default_sizes_are_small_medium_large() {
        let config: TaskConfig = parse_config(&minimal("")).unwrap();
        let names: Vec<_> = config.sizes.iter().filter_map(|s| s.name.clone()).collect();
        assert_eq!(names, ["small", "medium", "large"]);
        assert_eq!(config.sizes[2].width, Some(RawDimension::Integer(1024)));
    }

    #[test]
    fn parse_sizes_with_mixed_value_types() {
        let config = parse_config(&minimal(
            r#"
[[sizes]]
width = 320

[[sizes]]
width = "50%"
height = "25%"
quality = 60
gravity = "north"

[[sizes]]
height = "200px"
custom_out = "-strip"
"#,
        ))
        .unwrap();

        assert_eq!(config.sizes.len(), 3);
        assert_eq!(config.sizes[0].width, Some(RawDimension::Integer(320)));
        assert_eq!(config.sizes[1].width, Some(RawDimension::Text("50%".into())));
        assert_eq!(config.sizes[1].quality, Some(60.0));
        assert_eq!(config.sizes[1].gravity, Some(Gravity::North));
        assert_eq!(
            config.sizes[2].custom_out,
            Some(CustomArgs::One("-strip".into()))
        );
    }

    #[test]
    fn fractional_quality_reaches_spec_validation() {
        let config = parse_config(&minimal(
            r#"
[options]
quality = 90.5

[[sizes]]
width = 320
quality = 80.5

[[sizes]]
width = 640
quality = 250
"#,
        ))
        .unwrap();

        assert_eq!(config.options.quality, 90.5);
        assert_eq!(config.sizes[0].quality, Some(80.5));
        assert_eq!(config.sizes[1].quality, Some(250.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_options_keeps_defaults() {
        let config = parse_config(&minimal(
            r#"
[options]
engine = "gm"
concurrency = 4

[options.units]
multiply = "_by_"
"#,
        ))
        .unwrap();
        assert_eq!(config.options.engine, EngineKind::GraphicsMagick);
        assert_eq!(config.options.concurrency, 4);
        assert_eq!(config.options.units.multiply, "_by_");
        assert_eq!(config.options.units.percentage, "pc");
        assert_eq!(config.options.quality, 100.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = parse_config(&minimal("[options]\naspectRatio = false\n"));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn empty_sizes_is_error() {
        let config = parse_config(&minimal("sizes = []\n")).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn missing_files_is_error() {
        let config = parse_config("").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_concurrency_is_error() {
        let config = parse_config(&minimal("[options]\nconcurrency = 0\n")).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn custom_args_need_command_line_engine() {
        let config = parse_config(&minimal(
            "[[sizes]]\nwidth = 100\ncustom_in = [\"-interlace\", \"line\"]\n",
        ))
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = config;
        config.options.engine = EngineKind::ImageMagick;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_reads_and_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("responsive-images.toml");
        fs::write(&path, minimal("[options]\nquality = 80\n")).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.options.quality, 80.0);
        assert_eq!(config.files[0].dest, "out");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("responsive-images.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config.options, RunOptions::default());
        assert_eq!(config.sizes, default_sizes());
        assert!(config.files.is_empty());
    }
}
