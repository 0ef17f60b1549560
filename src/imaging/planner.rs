//! Transform planning: which geometric operation a derivative needs.
//!
//! Given a [`SizeSpec`] and the natural size of a source, [`decide`] picks
//! the mode (resize or crop), the [`SizingMethod`] and the effective target
//! box, and [`plan`] turns that into the ordered [`Operation`] list of a
//! [`TransformJob`].
//!
//! ## Decision order
//!
//! 1. No aspect ratio and both edges requested → crop mode, fill then crop.
//! 2. Otherwise resize (or sample) fitted inside the box.
//! 3. When the request exceeds the natural size:
//!    - `create_no_scaled_image` → no output at all;
//!    - `upscale` → fill (crop or aspect-preserving resize) or stretch;
//!    - otherwise, with aspect ratio kept, clamp the box to the natural size.
//!
//! ## Operation order
//!
//! ```text
//! custom input args → filter → resize|sample → crop → sharpen → density → custom output args
//! ```

use super::backend::Dimensions;
use super::calculations::percent_of;
use super::params::{Operation, SizingMethod, TransformJob};
use crate::spec::{Dimension, SizeSpec};
use std::path::Path;

/// Geometric mode of a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Resize,
    Crop,
}

/// Outcome of the sizing decision for one (source, spec) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub mode: Mode,
    pub method: SizingMethod,
    /// Box handed to the resize/sample step.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Final crop box, only in [`Mode::Crop`].
    pub crop: Option<(u32, u32)>,
}

/// What to do for one (source, spec) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// The spec would upscale and asks for no scaled image. Not an error.
    SkipUpscale,
    Transform(TransformJob),
}

/// Resolve a requested edge against the natural edge.
fn requested(dimension: Option<Dimension>, natural: u32) -> Option<u32> {
    dimension.map(|d| match d {
        Dimension::Pixels(px) => px,
        Dimension::Percent(pc) => percent_of(natural, pc),
    })
}

/// Decide mode, sizing method and target box. `None` means the pair must
/// produce no output because it would upscale.
pub fn decide(spec: &SizeSpec, natural: Dimensions) -> Option<Decision> {
    let width = requested(spec.width, natural.width);
    let height = requested(spec.height, natural.height);
    let crop = spec.is_crop();

    let mut decision = Decision {
        mode: if crop { Mode::Crop } else { Mode::Resize },
        method: if crop {
            SizingMethod::Fill
        } else {
            SizingMethod::Fit
        },
        width,
        height,
        crop: match (crop, width, height) {
            (true, Some(w), Some(h)) => Some((w, h)),
            _ => None,
        },
    };

    let exceeds = width.is_some_and(|w| w > natural.width)
        || height.is_some_and(|h| h > natural.height);

    if exceeds {
        if spec.create_no_scaled_image {
            return None;
        }
        if spec.upscale {
            decision.method = if crop || spec.aspect_ratio {
                SizingMethod::Fill
            } else {
                SizingMethod::Stretch
            };
        } else if spec.aspect_ratio {
            decision.width = Some(natural.width);
            decision.height = Some(natural.height);
        }
    }

    Some(decision)
}

/// Build the engine job for one (source, spec) pair.
pub fn plan(spec: &SizeSpec, natural: Dimensions, source: &Path, output: &Path) -> Plan {
    let Some(decision) = decide(spec, natural) else {
        return Plan::SkipUpscale;
    };

    let mut operations = Vec::new();

    if !spec.custom_in.is_empty() {
        operations.push(Operation::InputArgs(spec.custom_in.clone()));
    }
    if let Some(filter) = &spec.filter {
        operations.push(Operation::Filter(filter.clone()));
    }

    let (width, height, method) = (decision.width, decision.height, decision.method);
    operations.push(if spec.sample {
        Operation::Sample {
            width,
            height,
            method,
        }
    } else {
        Operation::Resize {
            width,
            height,
            method,
        }
    });

    if let Some((width, height)) = decision.crop {
        operations.push(Operation::Crop {
            width,
            height,
            gravity: spec.gravity,
        });
    }
    if let Some(sharpen) = spec.sharpen {
        operations.push(Operation::Sharpen(sharpen));
    }
    if let Some(density) = spec.density {
        operations.push(Operation::Density(density));
    }
    if !spec.custom_out.is_empty() {
        operations.push(Operation::OutputArgs(spec.custom_out.clone()));
    }

    Plan::Transform(TransformJob {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        operations,
        quality: spec.quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{Gravity, Sharpen};
    use crate::test_helpers::test_spec;

    const LANDSCAPE: Dimensions = Dimensions {
        width: 2000,
        height: 1000,
    };

    fn job(plan: Plan) -> TransformJob {
        match plan {
            Plan::Transform(job) => job,
            Plan::SkipUpscale => panic!("expected a transform, got SkipUpscale"),
        }
    }

    #[test]
    fn width_only_resizes_proportionally() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(320));

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!(decision.mode, Mode::Resize);
        assert_eq!(decision.method, SizingMethod::Fit);
        assert_eq!((decision.width, decision.height), (Some(320), None));
        assert_eq!(decision.crop, None);
    }

    #[test]
    fn no_aspect_ratio_with_both_edges_crops_at_gravity() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(200));
        spec.height = Some(Dimension::Pixels(200));
        spec.aspect_ratio = false;
        spec.gravity = Gravity::North;

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!(decision.mode, Mode::Crop);
        assert_eq!(decision.method, SizingMethod::Fill);

        let job = job(plan(&spec, LANDSCAPE, Path::new("a.jpg"), Path::new("b.jpg")));
        assert!(job.operations.contains(&Operation::Resize {
            width: Some(200),
            height: Some(200),
            method: SizingMethod::Fill,
        }));
        assert!(job.operations.contains(&Operation::Crop {
            width: 200,
            height: 200,
            gravity: Gravity::North,
        }));
    }

    #[test]
    fn upscale_disallowed_clamps_to_natural_size() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(3000));
        spec.upscale = false;
        spec.aspect_ratio = true;

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!((decision.width, decision.height), (Some(2000), Some(1000)));
        assert_eq!(decision.method, SizingMethod::Fit);
    }

    #[test]
    fn create_no_scaled_image_skips_upscale() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(3000));
        spec.upscale = false;
        spec.create_no_scaled_image = true;

        assert_eq!(decide(&spec, LANDSCAPE), None);
        assert_eq!(
            plan(&spec, LANDSCAPE, Path::new("a.jpg"), Path::new("b.jpg")),
            Plan::SkipUpscale
        );
    }

    #[test]
    fn create_no_scaled_image_ignored_when_not_upscaling() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(1000));
        spec.create_no_scaled_image = true;

        assert!(decide(&spec, LANDSCAPE).is_some());
    }

    #[test]
    fn upscale_with_aspect_ratio_fills() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(3000));
        spec.upscale = true;

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!(decision.method, SizingMethod::Fill);
        assert_eq!(decision.width, Some(3000));
    }

    #[test]
    fn upscale_crop_keeps_fill() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(3000));
        spec.height = Some(Dimension::Pixels(3000));
        spec.aspect_ratio = false;
        spec.upscale = true;

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!(decision.mode, Mode::Crop);
        assert_eq!(decision.method, SizingMethod::Fill);
        assert_eq!(decision.crop, Some((3000, 3000)));
    }

    #[test]
    fn upscale_single_edge_without_aspect_ratio_stretches() {
        let mut spec = test_spec();
        spec.height = Some(Dimension::Pixels(1500));
        spec.aspect_ratio = false;
        spec.upscale = true;

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!(decision.mode, Mode::Resize);
        assert_eq!(decision.method, SizingMethod::Stretch);
    }

    #[test]
    fn percentages_resolve_against_natural_size() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Percent(50.0));

        let decision = decide(&spec, LANDSCAPE).unwrap();
        assert_eq!(decision.width, Some(1000));
    }

    #[test]
    fn percentages_over_100_count_as_upscale() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Percent(150.0));
        spec.create_no_scaled_image = true;

        assert_eq!(decide(&spec, LANDSCAPE), None);
    }

    #[test]
    fn sample_flag_switches_operation() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(100));
        spec.sample = true;

        let job = job(plan(&spec, LANDSCAPE, Path::new("a.jpg"), Path::new("b.jpg")));
        assert!(matches!(
            job.operations.as_slice(),
            [Operation::Sample { width: Some(100), .. }, ..]
        ));
    }

    #[test]
    fn operations_follow_engine_order() {
        let mut spec = test_spec();
        spec.width = Some(Dimension::Pixels(200));
        spec.height = Some(Dimension::Pixels(100));
        spec.aspect_ratio = false;
        spec.custom_in = vec!["-interlace".into(), "line".into()];
        spec.custom_out = vec!["-strip".into()];
        spec.filter = Some("Lanczos".into());
        spec.sharpen = Some(Sharpen {
            radius: 0.0,
            sigma: 1.0,
        });
        spec.density = Some(72);

        let job = job(plan(&spec, LANDSCAPE, Path::new("a.jpg"), Path::new("b.jpg")));
        let kinds: Vec<&str> = job
            .operations
            .iter()
            .map(|op| match op {
                Operation::InputArgs(_) => "in",
                Operation::Filter(_) => "filter",
                Operation::Resize { .. } => "resize",
                Operation::Sample { .. } => "sample",
                Operation::Crop { .. } => "crop",
                Operation::Sharpen(_) => "sharpen",
                Operation::Density(_) => "density",
                Operation::OutputArgs(_) => "out",
            })
            .collect();
        assert_eq!(
            kinds,
            ["in", "filter", "resize", "crop", "sharpen", "density", "out"]
        );
        assert_eq!(job.quality, spec.quality);
    }
}
