// Utility functions and helpers

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::auth::DEFAULT_ROLE;

/// Directory holding uploaded avatar images, keyed by subject id.
pub const AVATAR_DIR: &str = "static/avatars";

/// Normalize a role list: trim, lowercase, drop empties, sort, dedupe.
/// An absent or empty list yields the implicit default role.
pub fn normalize_roles(roles: Option<Vec<String>>) -> Vec<String> {
    let cleaned: BTreeSet<String> = roles
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect();

    if cleaned.is_empty() {
        vec![DEFAULT_ROLE.to_string()]
    } else {
        cleaned.into_iter().collect()
    }
}

/// Remove stored avatar artifacts for a subject.
///
/// Best effort: every failure here is logged and swallowed. A stale file on
/// disk must never fail the operation that triggered the cleanup.
pub fn remove_avatar_artifacts(avatar_dir: &Path, subject_id: &str) {
    let entries = match fs::read_dir(avatar_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("skipping avatar cleanup for {subject_id}: {e}");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_match = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem == subject_id);

        if is_match && let Err(e) = fs::remove_file(&path) {
            tracing::warn!("failed to remove stale avatar {}: {e}", path.display());
        }
    }
}
