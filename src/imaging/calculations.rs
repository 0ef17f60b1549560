//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Gravity, SizingMethod};

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w.max(1), h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h.max(1))
    }
}

/// Calculate the largest dimensions that fit inside a target area while
/// keeping the source aspect ratio.
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let ratio = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    let w = (src_w as f64 * ratio).round() as u32;
    let h = (src_h as f64 * ratio).round() as u32;
    (w.max(1), h.max(1))
}

/// Scale to a single requested edge, deriving the other from the aspect ratio.
fn proportional(source: (u32, u32), width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let (src_w, src_h) = source;
    match (width, height) {
        (Some(w), None) => {
            let h = (src_h as f64 * w as f64 / src_w as f64).round() as u32;
            (w, h.max(1))
        }
        (None, Some(h)) => {
            let w = (src_w as f64 * h as f64 / src_h as f64).round() as u32;
            (w.max(1), h)
        }
        _ => source,
    }
}

/// Resolve the output dimensions of a resize.
///
/// With only one edge requested every method scales proportionally. With both
/// edges the method decides: fit inside, cover, or match exactly.
///
/// ```
/// # use responsive_images::imaging::calculations::scaled_dimensions;
/// # use responsive_images::imaging::SizingMethod;
/// // 2000x1000 fitted into a 500x500 box → 500x250
/// assert_eq!(scaled_dimensions((2000, 1000), Some(500), Some(500), SizingMethod::Fit), (500, 250));
/// ```
pub fn scaled_dimensions(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    method: SizingMethod,
) -> (u32, u32) {
    match (width, height) {
        (Some(w), Some(h)) => match method {
            SizingMethod::Fit => calculate_fit_dimensions(source, (w, h)),
            SizingMethod::Fill => calculate_fill_dimensions(source, (w, h)),
            SizingMethod::Stretch => (w, h),
        },
        _ => proportional(source, width, height),
    }
}

/// Top-left offset of a `crop` box inside an `image` box, anchored at `gravity`.
///
/// The crop is clamped to the image: when the crop box is larger than the
/// image along an axis the offset on that axis is 0.
pub fn crop_offset(gravity: Gravity, image: (u32, u32), crop: (u32, u32)) -> (u32, u32) {
    let dx = image.0.saturating_sub(crop.0);
    let dy = image.1.saturating_sub(crop.1);

    let x = match gravity {
        Gravity::NorthWest | Gravity::West | Gravity::SouthWest => 0,
        Gravity::North | Gravity::Center | Gravity::South => dx / 2,
        Gravity::NorthEast | Gravity::East | Gravity::SouthEast => dx,
    };
    let y = match gravity {
        Gravity::NorthWest | Gravity::North | Gravity::NorthEast => 0,
        Gravity::West | Gravity::Center | Gravity::East => dy / 2,
        Gravity::SouthWest | Gravity::South | Gravity::SouthEast => dy,
    };
    (x, y)
}

/// Resolve a percentage of a natural edge to whole pixels (at least 1).
pub fn percent_of(natural: u32, percent: f64) -> u32 {
    ((natural as f64 * percent / 100.0).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_fill_dimensions tests
    // =========================================================================

    #[test]
    fn fill_wider_source_to_portrait_target() {
        // 800x600 (4:3) → 400x500 target
        // Source is wider, so height matches: 500, width = 500 * (4/3) = 667
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 500)), (667, 500));
    }

    #[test]
    fn fill_taller_source_to_landscape_target() {
        assert_eq!(calculate_fill_dimensions((600, 800), (500, 400)), (500, 667));
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 300)), (400, 300));
    }

    #[test]
    fn fill_landscape_source_to_square() {
        // 2000x1000 → 200x200: height matches, width doubles
        assert_eq!(calculate_fill_dimensions((2000, 1000), (200, 200)), (400, 200));
    }

    // =========================================================================
    // calculate_fit_dimensions tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_square() {
        assert_eq!(calculate_fit_dimensions((2000, 1000), (500, 500)), (500, 250));
    }

    #[test]
    fn fit_portrait_into_landscape_box() {
        assert_eq!(calculate_fit_dimensions((600, 900), (400, 300)), (200, 300));
    }

    #[test]
    fn fit_never_collapses_to_zero() {
        assert_eq!(calculate_fit_dimensions((10000, 10), (10, 10)), (10, 1));
    }

    // =========================================================================
    // scaled_dimensions tests
    // =========================================================================

    #[test]
    fn width_only_scales_height_proportionally() {
        for method in [SizingMethod::Fit, SizingMethod::Fill, SizingMethod::Stretch] {
            assert_eq!(
                scaled_dimensions((2000, 1000), Some(320), None, method),
                (320, 160)
            );
        }
    }

    #[test]
    fn height_only_scales_width_proportionally() {
        assert_eq!(
            scaled_dimensions((2000, 1000), None, Some(100), SizingMethod::Fit),
            (200, 100)
        );
    }

    #[test]
    fn stretch_ignores_aspect() {
        assert_eq!(
            scaled_dimensions((2000, 1000), Some(300), Some(300), SizingMethod::Stretch),
            (300, 300)
        );
    }

    #[test]
    fn no_target_keeps_source() {
        assert_eq!(
            scaled_dimensions((640, 480), None, None, SizingMethod::Fit),
            (640, 480)
        );
    }

    // =========================================================================
    // crop_offset tests
    // =========================================================================

    #[test]
    fn crop_offset_compass_points() {
        let image = (400, 200);
        let crop = (200, 200);
        assert_eq!(crop_offset(Gravity::Center, image, crop), (100, 0));
        assert_eq!(crop_offset(Gravity::West, image, crop), (0, 0));
        assert_eq!(crop_offset(Gravity::East, image, crop), (200, 0));

        let tall = (200, 400);
        assert_eq!(crop_offset(Gravity::North, tall, crop), (0, 0));
        assert_eq!(crop_offset(Gravity::South, tall, crop), (0, 200));
        assert_eq!(crop_offset(Gravity::Center, tall, crop), (0, 100));
        assert_eq!(crop_offset(Gravity::SouthEast, (300, 300), crop), (100, 100));
        assert_eq!(crop_offset(Gravity::NorthWest, (300, 300), crop), (0, 0));
    }

    #[test]
    fn crop_offset_larger_crop_is_zero() {
        assert_eq!(crop_offset(Gravity::SouthEast, (100, 100), (200, 200)), (0, 0));
    }

    #[test]
    fn percent_resolution() {
        assert_eq!(percent_of(2000, 50.0), 1000);
        assert_eq!(percent_of(1000, 12.5), 125);
        assert_eq!(percent_of(3, 1.0), 1);
    }
}
