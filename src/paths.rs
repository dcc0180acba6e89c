//! Source file discovery.
//!
//! Each configured source root is walked recursively.  A file is kept
//! when its extension is one of the configured source extensions and its
//! absolute path matches none of the ignore patterns.  Entries are visited
//! in file-name order, so the resulting list is stable for an unchanged
//! tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;

/// Walk `roots` and collect the matching files, in root order.
///
/// Roots that do not exist are skipped with a warning.  Duplicates (a file
/// reachable from two overlapping roots) are listed once.
pub fn discover(roots: &[PathBuf], extensions: &[String], ignore: &[Pattern]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        if !root.exists() {
            tracing::warn!("source path {} does not exist", root.display());
            continue;
        }

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = absolute(entry.path());
            if !has_extension(&path, extensions) {
                continue;
            }
            if let Some(pattern) = ignore.iter().find(|p| p.matches_path(&path)) {
                tracing::trace!("{} ignored by {}", path.display(), pattern);
                continue;
            }
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    tracing::debug!("discovered {} source files", paths.len());
    paths
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        let exts = vec!["php".to_string()];
        assert!(has_extension(Path::new("/a/Model.php"), &exts));
        assert!(has_extension(Path::new("/a/Legacy.PHP"), &exts));
        assert!(!has_extension(Path::new("/a/notes.txt"), &exts));
        assert!(!has_extension(Path::new("/a/Makefile"), &exts));
    }
}
