//! Size spec validation.
//!
//! Accepted edge values:
//!
//! | Input | Parsed as |
//! |---|---|
//! | `320`, `"320"`, `"320px"` | `Pixels(320)` |
//! | `"50%"`, `"12.5%"`, `".5%"`, `"1.5"`, `12.5` | `Percent(..)` |
//! | `0`, `"0px"`, `"0%"` | unset |
//!
//! Rejected: negatives, more than one decimal point, trailing characters
//! other than `px` or `%`, and a spec that mixes a percentage edge with a
//! pixel edge. A decimal reads as a percentage whether or not it carries `%`. An invalid spec is skipped with a
//! warning; the rest of the run continues.

use crate::imaging::Quality;
use crate::spec::Dimension;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecValidationError {
    #[error("Either width and/or height must be specified")]
    MissingSize,
    #[error("Size is invalid ({value}): expected pixels like 320 or 320px, or a percentage like 50%")]
    InvalidSize { value: String },
    #[error(
        "Width/height value is not valid ({width}, {height}). Percentages and pixels cannot be mixed"
    )]
    MixedUnits { width: String, height: String },
    #[error("Quality {0} is out of range; expected a value between 1 (exclusive) and 100")]
    InvalidQuality(f64),
    #[error("{field} must be a list of non-empty arguments")]
    InvalidCustomArgs { field: &'static str },
}

/// Digits with an optional `px` suffix.
fn parse_pixels(value: &str) -> Option<u32> {
    let digits = value.strip_suffix("px").unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `[digits][.]digits` with an optional `%`.
fn parse_percent(value: &str) -> Option<f64> {
    let number = value.strip_suffix('%').unwrap_or(value);
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => ("", number),
    };
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if fraction.is_empty() || !digits(whole) || !digits(fraction) {
        return None;
    }
    number.parse().ok()
}

fn parse_dimension(value: &str) -> Result<Option<Dimension>, SpecValidationError> {
    let value = value.trim();
    if let Some(px) = parse_pixels(value) {
        return Ok((px > 0).then_some(Dimension::Pixels(px)));
    }
    if let Some(pc) = parse_percent(value) {
        return Ok((pc > 0.0).then_some(Dimension::Percent(pc)));
    }
    Err(SpecValidationError::InvalidSize {
        value: value.to_string(),
    })
}

/// Parse and cross-check the two edges of a spec.
///
/// At least one edge must be set and non-zero. When both are set they must
/// use the same unit.
pub fn validate_size(
    width: Option<&str>,
    height: Option<&str>,
) -> Result<(Option<Dimension>, Option<Dimension>), SpecValidationError> {
    let parsed_width = width.map(parse_dimension).transpose()?.flatten();
    let parsed_height = height.map(parse_dimension).transpose()?.flatten();

    match (parsed_width, parsed_height) {
        (None, None) => Err(SpecValidationError::MissingSize),
        (Some(w), Some(h)) if w.is_percent() != h.is_percent() => {
            Err(SpecValidationError::MixedUnits {
                width: w.to_string(),
                height: h.to_string(),
            })
        }
        pair => Ok(pair),
    }
}

/// Quality must satisfy `1 < q <= 100`. A quality of exactly 1 is rejected.
/// Fractional values are rounded for the encoder.
pub fn validate_quality(quality: f64) -> Result<Quality, SpecValidationError> {
    if quality > 1.0 && quality <= 100.0 {
        Ok(Quality::new(quality.round() as u32))
    } else {
        Err(SpecValidationError::InvalidQuality(quality))
    }
}

pub fn validate_custom_args(
    field: &'static str,
    args: &[String],
) -> Result<(), SpecValidationError> {
    if args.iter().any(|arg| arg.trim().is_empty()) {
        return Err(SpecValidationError::InvalidCustomArgs { field });
    }
    Ok(())
}
