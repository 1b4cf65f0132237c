//! Local image file lookup.

use std::path::{Component, Path, PathBuf};

/// Outcome of locating an image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    /// `http(s)://` URL, embedded as is.
    Remote(String),
    /// Existing file on disk.
    Local(PathBuf),
    /// No candidate exists; carries every path that was tried.
    Missing(Vec<PathBuf>),
}

/// Paths tried for `image_path`, in order.
///
/// 1. relative to `base_dir`
/// 2. relative to `base_dir/attachments`
/// 3. `base_dir` joined with each `/`-separated segment
/// 4. lexically cleaned `base_dir`-relative path, when it contains `..`
///
/// An absolute path is its only candidate.
#[must_use]
pub fn candidates(base_dir: &Path, image_path: &str) -> Vec<PathBuf> {
    let normalized = image_path.replace('\\', "/");
    let path = Path::new(&normalized);
    if path.is_absolute() {
        return vec![path.to_path_buf()];
    }

    let mut paths = vec![base_dir.join(path), base_dir.join("attachments").join(path)];

    if normalized.contains('/') {
        let joined = normalized
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(base_dir.to_path_buf(), |acc, segment| acc.join(segment));
        paths.push(joined);
    }

    if normalized.contains("..") {
        paths.push(clean(&base_dir.join(path)));
    }

    paths
}

/// Resolve `..` and `.` components without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Locate `image_path` relative to `base_dir`.
#[must_use]
pub fn locate(base_dir: &Path, image_path: &str) -> ResolutionState {
    if image_path.starts_with("http://") || image_path.starts_with("https://") {
        return ResolutionState::Remote(image_path.to_owned());
    }
    let tried = candidates(base_dir, image_path);
    match tried.iter().find(|p| p.is_file()) {
        Some(found) => ResolutionState::Local(found.clone()),
        None => ResolutionState::Missing(tried),
    }
}
