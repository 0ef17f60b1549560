//! Newer-only policy: existing destinations are left alone.

use std::path::Path;

/// `true` when `new_files_only` is set and `dest` already exists.
///
/// A skipped pair counts as done: no engine call and no tally increment.
pub fn should_skip(new_files_only: bool, dest: &Path) -> bool {
    new_files_only && dest.exists()
}
