//! Display names and output names for size specs.
//!
//! A spec's display name is its explicit `name` when given, otherwise it is
//! derived from the requested edges and the configured unit labels:
//!
//! | width | height | labels (pc / px / x) | name |
//! |---|---|---|---|
//! | `640` | | `pc` / `` / `x` | `640` |
//! | `640` | `480` | `pc` / `` / `x` | `640x480` |
//! | `50%` | | `pc` / `` / `x` | `50pc` |
//! | `50%` | `25%` | `pc` / `` / `x` | `50pcx25pc` |
//!
//! The output name is what gets appended to the source basename. With
//! `rename = false` only the suffix survives, so several specs may share an
//! output name and keep the original filename.

use crate::config::UnitLabels;
use crate::spec::Dimension;

fn edge_label(dimension: Dimension, units: &UnitLabels) -> String {
    let label = if dimension.is_percent() {
        &units.percentage
    } else {
        &units.pixel
    };
    format!("{}{}", dimension.value(), label)
}

/// Explicit name, or one built from the edges.
pub fn display_name(
    name: Option<&str>,
    width: Option<Dimension>,
    height: Option<Dimension>,
    units: &UnitLabels,
) -> String {
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match (width, height) {
        (Some(w), Some(h)) => format!(
            "{}{}{}",
            edge_label(w, units),
            units.multiply,
            edge_label(h, units)
        ),
        (Some(edge), None) | (None, Some(edge)) => edge_label(edge, units),
        (None, None) => String::new(),
    }
}

/// `prefix + name + suffix` when renaming, the bare suffix otherwise.
pub fn output_name(name: &str, prefix: &str, suffix: &str, rename: bool) -> String {
    if rename {
        format!("{prefix}{name}{suffix}")
    } else {
        suffix.to_string()
    }
}
