//! Source discovery.
//!
//! Each `[[files]]` group names a working directory, a list of glob patterns
//! and a destination root. [`discover`] walks the working directory and keeps
//! every file whose cwd-relative path matches the patterns:
//!
//! ```text
//! cwd = "images_src"            images_src/                  dest = "images"
//! src = ["**/*.{jpg,png}"]      ├── a.jpg          →         images/a.jpg
//!                               ├── notes.txt      (ignored)
//!                               └── trips/b.png    →         images/trips/b.png
//! ```
//!
//! The right-hand side is each source's base destination; the size's output
//! name is added later by [`destination`](crate::destination).
//!
//! ## Pattern rules
//!
//! - `*` and `?` stay inside one path segment; `**` crosses directories.
//! - `{a,b}` lists alternatives and may nest.
//! - A pattern starting with `!` removes matches of earlier patterns.
//!
//! Results are sorted by relative path so runs are deterministic.

use crate::config::FileGroup;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory does not exist: {0}")]
    MissingCwd(PathBuf),
    #[error("Invalid source pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One discovered source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the group's cwd.
    pub relative: PathBuf,
    /// `dest/<relative>`, before the size's output name is applied.
    pub dest: PathBuf,
}

/// Sources of one `[[files]]` group, with the settings destinations need.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGroup {
    pub cwd: PathBuf,
    /// Template resolved against the task file's directory.
    pub custom_dest: Option<String>,
    pub sources: Vec<SourceFile>,
}

impl SourceGroup {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Expand `{a,b}` alternatives. Nested groups are expanded too.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    // Find the matching close brace and top-level commas.
    let mut depth = 0;
    let mut close = None;
    let mut commas = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let i = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    if commas.is_empty() {
        // `{x}` is literal text; keep expanding after it.
        let (head, tail) = pattern.split_at(close + 1);
        return expand_braces(tail)
            .into_iter()
            .map(|rest| format!("{head}{rest}"))
            .collect();
    }

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(&commas);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| expand_braces(&format!("{prefix}{}{suffix}", &pattern[w[0] + 1..w[1]])))
        .collect()
}

/// Compiled include/exclude patterns of one group.
struct Matcher {
    rules: Vec<(bool, Pattern)>,
}

impl Matcher {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    fn new(patterns: &[String]) -> Result<Self, ScanError> {
        let mut rules = Vec::new();
        for raw in patterns {
            let (include, body) = match raw.strip_prefix('!') {
                Some(rest) => (false, rest),
                None => (true, raw.as_str()),
            };
            for expanded in expand_braces(body) {
                let pattern = Pattern::new(&expanded).map_err(|source| ScanError::Pattern {
                    pattern: raw.clone(),
                    source,
                })?;
                rules.push((include, pattern));
            }
        }
        Ok(Self { rules })
    }

    /// Later rules win, so `!` patterns drop earlier matches.
    fn matches(&self, relative: &str) -> bool {
        self.rules
            .iter()
            .fold(false, |matched, (include, pattern)| {
                if pattern.matches_with(relative, Self::OPTIONS) {
                    *include
                } else {
                    matched
                }
            })
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn discover_group(group: &FileGroup, base_dir: &Path) -> Result<SourceGroup, ScanError> {
    let cwd = resolve(base_dir, &group.cwd);
    if !cwd.is_dir() {
        return Err(ScanError::MissingCwd(cwd));
    }
    let dest = resolve(base_dir, &group.dest);
    let matcher = Matcher::new(&group.src)?;

    let mut found = BTreeMap::new();
    for entry in WalkDir::new(&cwd).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&cwd) else {
            continue;
        };
        let key = relative.to_string_lossy().replace('\\', "/");
        if matcher.matches(&key) {
            found.insert(
                key,
                SourceFile {
                    path: entry.path().to_path_buf(),
                    relative: relative.to_path_buf(),
                    dest: dest.join(relative),
                },
            );
        }
    }

    Ok(SourceGroup {
        custom_dest: group
            .custom_dest
            .as_deref()
            .map(|template| resolve(base_dir, template).to_string_lossy().into_owned()),
        cwd,
        sources: found.into_values().collect(),
    })
}

/// Discover sources for every group. Paths resolve against `base_dir`.
pub fn discover(groups: &[FileGroup], base_dir: &Path) -> Result<Vec<SourceGroup>, ScanError> {
    groups
        .iter()
        .map(|group| discover_group(group, base_dir))
        .collect()
}
