//! Destination paths for (source, spec) pairs.
//!
//! Two modes:
//!
//! - **Plain**: `dir(base) / stem + output_name + ext`, where `base` is the
//!   source's destination path as laid out by its file group.
//!   `photos/a.jpg` with output name `-640` becomes `photos/a-640.jpg`.
//! - **Templated**: the group's `custom_dest` is expanded with every field of
//!   the size spec plus `path`, the source's directory relative to the group's
//!   cwd. Placeholders use `{%= field %}`. The result is a directory; the file
//!   keeps its original name, without the output name. Specs that share a
//!   template that does not mention a distinguishing field resolve to the
//!   same file: under the newer-only policy the first spec writes it and the
//!   later ones count it as skipped; with `new_files_only = false` each later
//!   spec overwrites it.
//!
//! Both modes create the destination directory before returning.

use crate::spec::SizeSpec;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DestinationError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Destination template references unknown field '{field}': {template}")]
    UnknownField { field: String, template: String },
    #[error("Unterminated placeholder in destination template: {0}")]
    Unterminated(String),
    #[error("Destination has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("Failed to expose spec fields to template: {0}")]
    Fields(#[from] serde_json::Error),
}

const OPEN: &str = "{%=";
const CLOSE: &str = "%}";

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Expand `{%= field %}` placeholders from a JSON object.
pub fn expand_template(template: &str, fields: &Value) -> Result<String, DestinationError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            return Err(DestinationError::Unterminated(template.to_string()));
        };
        let field = after[..end].trim();
        let value = fields
            .get(field)
            .ok_or_else(|| DestinationError::UnknownField {
                field: field.to_string(),
                template: template.to_string(),
            })?;
        out.push_str(&render(value));
        rest = &after[end + CLOSE.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Source directory relative to `cwd`, with a trailing `/` when non-empty.
fn relative_dir(source: &Path, cwd: &Path) -> String {
    let parent = source.parent().unwrap_or(Path::new(""));
    let relative = parent.strip_prefix(cwd).unwrap_or(parent);
    let text = relative.to_string_lossy().replace('\\', "/");
    if text.is_empty() {
        text
    } else {
        format!("{text}/")
    }
}

fn ensure_dir(dir: &Path) -> Result<(), DestinationError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| DestinationError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Resolve the output file for one source under one spec.
pub fn destination(
    source: &Path,
    base: &Path,
    spec: &SizeSpec,
    custom_dest: Option<&str>,
    cwd: &Path,
) -> Result<PathBuf, DestinationError> {
    let file_name = base
        .file_name()
        .ok_or_else(|| DestinationError::NoFileName(base.to_path_buf()))?;

    match custom_dest {
        Some(template) => {
            let mut fields = serde_json::to_value(spec)?;
            if let Value::Object(map) = &mut fields {
                map.insert("path".into(), Value::String(relative_dir(source, cwd)));
            }
            let dir = PathBuf::from(expand_template(template, &fields)?);
            ensure_dir(&dir)?;
            Ok(dir.join(file_name))
        }
        None => {
            let dir = base.parent().unwrap_or(Path::new(""));
            ensure_dir(dir)?;
            let stem = base.file_stem().unwrap_or(file_name).to_string_lossy();
            let name = match base.extension() {
                Some(ext) => format!("{}{}.{}", stem, spec.output_name, ext.to_string_lossy()),
                None => format!("{}{}", stem, spec.output_name),
            };
            Ok(dir.join(name))
        }
    }
}
