//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Run
//!
//! Each spec leads with its positional index and name, followed by one line
//! per source as its unit finishes, and the tally once all units are done:
//!
//! ```text
//! 001 small (3 sources)
//!     dawn.jpg → dawn-small.jpg: written
//!     dusk.jpg → dusk-small.jpg: exists
//!     loop.gif: animated, skipped
//! Resized 1 file for small
//! ```
//!
//! The tally line is omitted when nothing was written for a spec.
//!
//! ## Check
//!
//! ```text
//! Sizes
//! 001 small → -small (320)
//! 002 thumb → -thumb (200x200, crop North)
//!
//! Invalid sizes
//!     #3: Quality 1 is out of range; expected a value between 1 (exclusive) and 100
//!
//! Sources
//! images_src (2 files)
//!     dawn.jpg
//!     trips/dusk.jpg
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::process::{ProcessEvent, RunPlan, RunSummary, UnitOutcome};
use crate::spec::SizeSpec;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Spec geometry as shown in listings: `320`, `200x200, crop North`.
fn spec_geometry(spec: &SizeSpec) -> String {
    let edge = |d: Option<crate::spec::Dimension>| d.map(|d| d.to_string()).unwrap_or_default();
    let size = match (spec.width, spec.height) {
        (Some(_), Some(_)) => format!("{}x{}", edge(spec.width), edge(spec.height)),
        _ => format!("{}{}", edge(spec.width), edge(spec.height)),
    };
    if spec.is_crop() {
        format!("{}, crop {}", size, spec.gravity)
    } else {
        size
    }
}

// ============================================================================
// Run output
// ============================================================================

/// Format a single run progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::SpecInvalid { index, reason } => {
            vec![format!("Size #{} skipped: {}", index + 1, reason)]
        }
        ProcessEvent::SpecStarted { id, name, sources } => {
            vec![format!(
                "{} {} ({})",
                format_index(id.0 + 1),
                name,
                plural(*sources, "source")
            )]
        }
        ProcessEvent::UnitFinished {
            source,
            dest,
            outcome,
            ..
        } => {
            let line = match outcome {
                UnitOutcome::Written => {
                    format!("{} \u{2192} {}: written", file_name(source), file_name(dest))
                }
                UnitOutcome::SkippedExisting => {
                    format!("{} \u{2192} {}: exists", file_name(source), file_name(dest))
                }
                UnitOutcome::SkippedAnimated => {
                    format!("{}: animated, skipped", file_name(source))
                }
                UnitOutcome::SkippedUpscale => {
                    format!("{}: smaller than requested, skipped", file_name(source))
                }
            };
            vec![format!("{}{}", indent(1), line)]
        }
        ProcessEvent::SpecCompleted { name, written, .. } => {
            if *written == 0 {
                Vec::new()
            } else {
                vec![format!("Resized {} for {}", plural(*written, "file"), name)]
            }
        }
    }
}

/// Format the end-of-run summary.
///
/// ```text
/// Engine: built-in
/// 001 small: 2 written, 1 skipped
/// 002 large: 0 written, 3 skipped
/// 1 invalid size skipped
/// Resized 2 files in total
/// ```
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!("Engine: {}", summary.engine)];
    for spec in &summary.specs {
        lines.push(format!(
            "{} {}: {} written, {} skipped",
            format_index(spec.id.0 + 1),
            spec.name,
            spec.written,
            spec.skipped
        ));
    }
    if !summary.invalid.is_empty() {
        lines.push(format!(
            "{} skipped",
            plural(summary.invalid.len(), "invalid size")
        ));
    }
    lines.push(format!(
        "Resized {} in total",
        plural(summary.total_written(), "file")
    ));
    lines
}

/// Format what a run would do, without running it.
pub fn format_check(plan: &RunPlan, base_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Sizes".to_string()];
    for spec in &plan.specs {
        lines.push(format!(
            "{} {} \u{2192} {} ({})",
            format_index(spec.id.0 + 1),
            spec.name,
            spec.output_name,
            spec_geometry(spec)
        ));
    }

    if !plan.invalid.is_empty() {
        lines.push(String::new());
        lines.push("Invalid sizes".to_string());
        for entry in &plan.invalid {
            lines.push(format!("{}#{}: {}", indent(1), entry.index + 1, entry.reason));
        }
    }

    lines.push(String::new());
    lines.push("Sources".to_string());
    for group in &plan.groups {
        let cwd = group.cwd.strip_prefix(base_dir).unwrap_or(&group.cwd);
        lines.push(format!(
            "{} ({})",
            cwd.display(),
            plural(group.len(), "file")
        ));
        for source in &group.sources {
            lines.push(format!(
                "{}{}",
                indent(1),
                source.relative.to_string_lossy().replace('\\', "/")
            ));
        }
    }
    lines
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

pub fn print_check(plan: &RunPlan, base_dir: &Path) {
    for line in format_check(plan, base_dir) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{EngineKind, Gravity};
    use crate::process::{InvalidSpec, SpecSummary};
    use crate::scan::{SourceFile, SourceGroup};
    use crate::spec::{Dimension, SpecId};
    use crate::test_helpers::test_spec;
    use std::path::PathBuf;

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn spec_started_shows_index_and_source_count() {
        let event = ProcessEvent::SpecStarted {
            id: SpecId(0),
            name: "small".into(),
            sources: 3,
        };
        assert_eq!(format_process_event(&event), vec!["001 small (3 sources)"]);
    }

    #[test]
    fn unit_lines_by_outcome() {
        let unit = |outcome| ProcessEvent::UnitFinished {
            id: SpecId(0),
            source: PathBuf::from("/in/dawn.jpg"),
            dest: PathBuf::from("/out/dawn-small.jpg"),
            outcome,
        };
        assert_eq!(
            format_process_event(&unit(UnitOutcome::Written)),
            vec!["    dawn.jpg → dawn-small.jpg: written"]
        );
        assert_eq!(
            format_process_event(&unit(UnitOutcome::SkippedExisting)),
            vec!["    dawn.jpg → dawn-small.jpg: exists"]
        );
        assert_eq!(
            format_process_event(&unit(UnitOutcome::SkippedAnimated)),
            vec!["    dawn.jpg: animated, skipped"]
        );
        assert_eq!(
            format_process_event(&unit(UnitOutcome::SkippedUpscale)),
            vec!["    dawn.jpg: smaller than requested, skipped"]
        );
    }

    #[test]
    fn completed_reports_only_when_files_written() {
        let done = |written| ProcessEvent::SpecCompleted {
            id: SpecId(0),
            name: "small".into(),
            written,
        };
        assert_eq!(
            format_process_event(&done(3)),
            vec!["Resized 3 files for small"]
        );
        assert_eq!(format_process_event(&done(1)), vec!["Resized 1 file for small"]);
        assert!(format_process_event(&done(0)).is_empty());
    }

    #[test]
    fn invalid_spec_line_is_one_based() {
        let event = ProcessEvent::SpecInvalid {
            index: 1,
            reason: "Either width and/or height must be specified".into(),
        };
        assert_eq!(
            format_process_event(&event),
            vec!["Size #2 skipped: Either width and/or height must be specified"]
        );
    }

    #[test]
    fn summary_lists_specs_and_total() {
        let summary = RunSummary {
            engine: EngineKind::Rust,
            specs: vec![
                SpecSummary {
                    id: SpecId(0),
                    name: "small".into(),
                    written: 2,
                    skipped: 1,
                },
                SpecSummary {
                    id: SpecId(1),
                    name: "large".into(),
                    written: 0,
                    skipped: 3,
                },
            ],
            invalid: vec![InvalidSpec {
                index: 2,
                reason: "bad".into(),
            }],
        };
        assert_eq!(
            format_summary(&summary),
            vec![
                "Engine: built-in",
                "001 small: 2 written, 1 skipped",
                "002 large: 0 written, 3 skipped",
                "1 invalid size skipped",
                "Resized 2 files in total",
            ]
        );
    }

    #[test]
    fn check_lists_sizes_and_sources() {
        let mut small = test_spec();
        small.name = "small".into();
        small.output_name = "-small".into();
        small.width = Some(Dimension::Pixels(320));

        let mut thumb = test_spec();
        thumb.id = SpecId(1);
        thumb.name = "thumb".into();
        thumb.output_name = "-thumb".into();
        thumb.width = Some(Dimension::Pixels(200));
        thumb.height = Some(Dimension::Pixels(200));
        thumb.aspect_ratio = false;
        thumb.gravity = Gravity::North;

        let base = PathBuf::from("/project");
        let plan = RunPlan {
            specs: vec![small, thumb],
            invalid: vec![InvalidSpec {
                index: 2,
                reason: "bad quality".into(),
            }],
            groups: vec![SourceGroup {
                cwd: base.join("images_src"),
                custom_dest: None,
                sources: vec![SourceFile {
                    path: base.join("images_src/trips/dusk.jpg"),
                    relative: PathBuf::from("trips/dusk.jpg"),
                    dest: base.join("images/trips/dusk.jpg"),
                }],
            }],
        };

        assert_eq!(
            format_check(&plan, &base),
            vec![
                "Sizes",
                "001 small → -small (320)",
                "002 thumb → -thumb (200x200, crop North)",
                "",
                "Invalid sizes",
                "    #3: bad quality",
                "",
                "Sources",
                "images_src (1 file)",
                "    trips/dusk.jpg",
            ]
        );
    }
}
