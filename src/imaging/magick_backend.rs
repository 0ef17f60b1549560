//! GraphicsMagick / ImageMagick engine: shells out to the command line tools.
//!
//! | Operation | GraphicsMagick | ImageMagick |
//! |---|---|---|
//! | Identify | `gm identify -format "%m:%T:%s\n"` | `identify -format …` |
//! | Natural size | `gm identify -format "%w %h\n"` | `identify -format …` |
//! | Transform | `gm convert [in] src [ops] dst` | `convert [in] src [ops] dst` |
//!
//! Command lines are built by [`convert_args`], a pure function, so the exact
//! argument order is unit tested without either tool installed.

use super::backend::{BackendError, Dimensions, EngineKind, ImageEngine, ImageInfo};
use super::params::{Operation, SizingMethod, TransformJob};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::trace;

/// Command line engine for GraphicsMagick (`gm`) or ImageMagick.
pub struct MagickEngine {
    kind: EngineKind,
}

impl MagickEngine {
    pub fn graphicsmagick() -> Self {
        Self {
            kind: EngineKind::GraphicsMagick,
        }
    }

    pub fn imagemagick() -> Self {
        Self {
            kind: EngineKind::ImageMagick,
        }
    }

    fn command(&self, tool: &str) -> Command {
        match self.kind {
            EngineKind::GraphicsMagick => {
                let mut cmd = Command::new("gm");
                cmd.arg(tool);
                cmd
            }
            _ => Command::new(tool),
        }
    }

    /// Run a tool and return its stdout.
    fn run(&self, tool: &str, args: Vec<OsString>) -> Result<String, BackendError> {
        let mut cmd = self.command(tool);
        cmd.args(&args);
        trace!(engine = %self.kind, ?cmd, "running engine");

        let output = cmd.output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                BackendError::EngineUnavailable {
                    engine: self.kind,
                    reason: e.to_string(),
                }
            } else {
                BackendError::Io(e)
            }
        })?;

        if !output.status.success() {
            return Err(BackendError::ProcessingFailed(format!(
                "{} {} failed: {}",
                self.kind,
                tool,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn geometry(width: Option<u32>, height: Option<u32>, method: SizingMethod) -> String {
    format!(
        "{}x{}{}",
        width.map(|w| w.to_string()).unwrap_or_default(),
        height.map(|h| h.to_string()).unwrap_or_default(),
        method.geometry_flag()
    )
}

/// Arguments for `convert`, in engine order.
///
/// Input arguments go before the source file; everything else follows it,
/// with the destination last.
pub fn convert_args(job: &TransformJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    for op in &job.operations {
        if let Operation::InputArgs(custom) = op {
            args.extend(custom.iter().map(OsString::from));
        }
    }
    args.push(job.source.clone().into_os_string());

    let quality = job.quality.value().to_string();
    for op in &job.operations {
        match op {
            Operation::InputArgs(_) => {}
            Operation::Filter(name) => {
                args.push("-filter".into());
                args.push(name.into());
            }
            Operation::Resize {
                width,
                height,
                method,
            } => {
                args.push("-resize".into());
                args.push(geometry(*width, *height, *method).into());
                args.push("-quality".into());
                args.push(quality.as_str().into());
            }
            Operation::Sample {
                width,
                height,
                method,
            } => {
                args.push("-sample".into());
                args.push(geometry(*width, *height, *method).into());
                args.push("-quality".into());
                args.push(quality.as_str().into());
            }
            Operation::Crop {
                width,
                height,
                gravity,
            } => {
                args.push("-gravity".into());
                args.push(gravity.as_str().into());
                args.push("-crop".into());
                args.push(format!("{}x{}+0+0", width, height).into());
            }
            Operation::Sharpen(sharpen) => {
                args.push("-sharpen".into());
                args.push(format!("{}x{}", sharpen.radius, sharpen.sigma).into());
            }
            Operation::Density(dpi) => {
                args.push("-density".into());
                args.push(format!("{}x{}", dpi, dpi).into());
            }
            Operation::OutputArgs(custom) => args.extend(custom.iter().map(OsString::from)),
        }
    }

    args.push(job.output.clone().into_os_string());
    args
}

/// Parse `identify -format "%m:%T:%s\n"` output.
///
/// Multi-frame files print one line per frame; the last line carries the
/// highest scene number.
pub fn parse_identify(output: &str) -> Result<ImageInfo, BackendError> {
    let last = output.trim().lines().last().unwrap_or("");
    let parts: Vec<&str> = last.split(':').collect();
    let [format, delay, scene] = parts.as_slice() else {
        return Err(BackendError::ProcessingFailed(format!(
            "Could not parse identify output: {}",
            output
        )));
    };

    let number = |s: &str| s.trim().parse::<u32>().unwrap_or(0);
    Ok(ImageInfo {
        format: format.trim().to_ascii_uppercase(),
        frame_delay: number(*delay),
        scene_count: number(*scene) + 1,
    })
}

/// Parse `identify -format "%w %h\n"` output (first frame).
pub fn parse_size(output: &str) -> Result<Dimensions, BackendError> {
    let first = output.trim().lines().next().unwrap_or("");
    let mut parts = first.split_whitespace().map(str::parse::<u32>);
    match (parts.next(), parts.next()) {
        (Some(Ok(width)), Some(Ok(height))) => Ok(Dimensions { width, height }),
        _ => Err(BackendError::ProcessingFailed(format!(
            "Could not parse size output: {}",
            output
        ))),
    }
}

impl ImageEngine for MagickEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let out = self.run(
            "identify",
            vec![
                "-format".into(),
                "%m:%T:%s\n".into(),
                path.as_os_str().to_os_string(),
            ],
        )?;
        parse_identify(&out)
    }

    fn natural_size(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let out = self.run(
            "identify",
            vec![
                "-format".into(),
                "%w %h\n".into(),
                path.as_os_str().to_os_string(),
            ],
        )?;
        parse_size(&out)
    }

    fn transform(&self, job: &TransformJob) -> Result<(), BackendError> {
        self.run("convert", convert_args(job)).map(|_| ())
    }
}
