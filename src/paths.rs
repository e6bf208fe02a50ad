//! Package path resolution from root directories and the environment

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

/// Environment variable holding extra package root directories
pub const PACKAGES_PATHS_ENV_VAR: &str = "PYFLOW_PACKAGES_PATHS";

/// Delimiter between roots in [`PACKAGES_PATHS_ENV_VAR`]
pub const PACKAGES_PATHS_DELIMITER: char = ';';

/// Marker folder chain identifying a subdirectory that holds packages
pub const PACKAGE_MARKER_DIRS: [&str; 2] = ["PyFlow", "Packages"];

/// Resolve a set of root directories into a deduplicated ordered list of
/// concrete package directories.
///
/// Accumulation order is built-in roots, environment-variable roots, then
/// caller-supplied extra roots; order only makes load ordering
/// deterministic, package names stay the uniqueness key.
pub fn resolve_package_paths(
    built_in_roots: &[PathBuf],
    extra_roots: &[PathBuf],
    env_value: Option<&str>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for root in built_in_roots {
        expand_root(root, &mut paths);
    }

    if let Some(value) = env_value {
        for root in split_env_paths(value) {
            if root.exists() {
                expand_root(&root, &mut paths);
            } else {
                debug!("package root from environment does not exist: {}", root.display());
            }
        }
    }

    for root in extra_roots {
        expand_root(root, &mut paths);
    }

    paths
}

/// Resolve paths reading [`PACKAGES_PATHS_ENV_VAR`] from the process
/// environment
pub fn resolve_package_paths_from_env(
    built_in_roots: &[PathBuf],
    extra_roots: &[PathBuf],
) -> Vec<PathBuf> {
    let env_value = std::env::var(PACKAGES_PATHS_ENV_VAR).ok();
    resolve_package_paths(built_in_roots, extra_roots, env_value.as_deref())
}

/// Split the raw environment value into root paths.
///
/// Trailing delimiters are stripped before splitting; existence is checked
/// by the caller.
pub fn split_env_paths(value: &str) -> Vec<PathBuf> {
    value
        .trim_end_matches(PACKAGES_PATHS_DELIMITER)
        .split(PACKAGES_PATHS_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Expand one root into concrete package directories.
///
/// Every immediate subdirectory carrying the marker chain resolves to its
/// nested packages folder. A root with no such subdirectory is taken to
/// already be a package directory and is used unmodified.
fn expand_root(root: &Path, paths: &mut Vec<PathBuf>) {
    match nested_package_paths(root) {
        Ok(nested) if !nested.is_empty() => {
            for path in nested {
                push_unique(paths, path);
            }
        }
        Ok(_) => push_unique(paths, root.to_path_buf()),
        Err(err) => {
            debug!("skipping package root {}: {}", root.display(), err);
        }
    }
}

fn nested_package_paths(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let mut marker = path;
        for segment in PACKAGE_MARKER_DIRS {
            marker = marker.join(segment);
        }
        if marker.is_dir() {
            found.push(marker);
        }
    }
    Ok(found)
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}
