//! Resolution of raw input paths onto the canonical installer layout.

use thiserror::Error;

/// The top-level folder name every canonical path is rooted at.
pub const CANONICAL_ROOT: &str = "Content";

/// Recognized top-level root folder names, in match priority order.
///
/// The search is case-sensitive; the lowercase variant is matched but kept
/// verbatim in the rewritten paths.
pub const TOP_LEVEL_ROOTS: [&str; 3] = ["Content", "content", "My Library"];

/// Matched root names that are rewritten to [`CANONICAL_ROOT`].
const REWRITE_ROOTS: [&str; 2] = ["Content", "My Library"];

/// Known content category folder names, in match priority order.
///
/// Each name is delimited by separators so only whole path segments match.
pub const CATEGORY_DIRS: [&str; 18] = [
    "/Animals/",
    "/Camera Presets/",
    "/DAZ Studio Tutorials/",
    "/data/",
    "/Documentation/",
    "/Environments/",
    "/Figures/",
    "/General/",
    "/Light Presets/",
    "/People/",
    "/Presets/",
    "/Props/",
    "/Render Presets/",
    "/Scene Builder/",
    "/Scenes/",
    "/Scripts/",
    "/Shader Presets/",
    "/Runtime/",
];

/// Minimum number of `/`-separated segments a canonical path must have to be
/// installable. Shorter paths would place loose files at or directly under
/// the content root and are dropped instead.
pub const MIN_CANONICAL_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no recognized content root or category folder in input paths")]
    NoCanonicalRoot,
}

/// Rewrite a batch of raw input paths onto the canonical installer layout.
///
/// Resolution is driven by a single representative entry, not validated per
/// entry:
///
/// 1. The *first* path is scanned, case-sensitively, for a top-level root
///    name from [`TOP_LEVEL_ROOTS`] (priority order decides, not textual
///    position). A hit fixes a truncation offset applied uniformly to the
///    whole batch; matched names in the rewrite set are replaced with
///    [`CANONICAL_ROOT`].
/// 2. Otherwise every path is prefixed with `/` and scanned, in order and
///    case-insensitively, for a category name from [`CATEGORY_DIRS`]. The
///    first path with any match fixes the cut offset for the whole batch,
///    and the earliest catalog name decides when several match. The results
///    are re-rooted under [`CANONICAL_ROOT`]. No match anywhere fails with
///    [`ResolveError::NoCanonicalRoot`].
///
/// Finally, paths with fewer than [`MIN_CANONICAL_SEGMENTS`] segments are
/// replaced with `None`.
///
/// Because only one entry decides, a batch whose first path spuriously
/// contains a root name as a substring is mis-rooted as a whole. Downstream
/// consumers depend on this policy; see the tests for the sharp edges.
pub fn resolve_by_first_entry(paths: &[String]) -> Result<Vec<Option<String>>, ResolveError> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let rewritten = match find_top_level_root(&paths[0]) {
        Some((offset, root)) => truncate_at_root(paths, offset, root),
        None => rebase_on_category_dir(paths)?,
    };

    Ok(rewritten.into_iter().map(apply_depth_filter).collect())
}

/// Scan `first` for a top-level root name. Priority order wins over textual
/// position: the first catalog name that occurs anywhere is taken.
fn find_top_level_root(first: &str) -> Option<(usize, &'static str)> {
    TOP_LEVEL_ROOTS
        .iter()
        .find_map(|root| first.find(root).map(|offset| (offset, *root)))
}

fn truncate_at_root(paths: &[String], offset: usize, root: &str) -> Vec<String> {
    paths
        .iter()
        .map(|path| {
            let tail = path.get(offset..).unwrap_or("");
            if REWRITE_ROOTS.contains(&root) {
                tail.replace(root, CANONICAL_ROOT)
            } else {
                tail.to_owned()
            }
        })
        .collect()
}

/// Fallback for inputs without a recognized top-level root: find a known
/// category folder in any path and re-root the whole batch at its offset.
fn rebase_on_category_dir(paths: &[String]) -> Result<Vec<String>, ResolveError> {
    let prefixed: Vec<String> = paths.iter().map(|path| format!("/{}", path)).collect();

    let mut cut_offset = None;
    'paths: for path in &prefixed {
        let lowered = path.to_lowercase();
        for category in CATEGORY_DIRS {
            if let Some(offset) = lowered.find(&category.to_lowercase()) {
                cut_offset = Some(offset);
                break 'paths;
            }
        }
    }
    let cut_offset = cut_offset.ok_or(ResolveError::NoCanonicalRoot)?;

    Ok(prefixed
        .iter()
        .map(|path| {
            let tail = path.get(cut_offset + 1..).unwrap_or("");
            format!("{}/{}", CANONICAL_ROOT, tail)
        })
        .collect())
}

fn apply_depth_filter(path: String) -> Option<String> {
    if path.split('/').count() >= MIN_CANONICAL_SEGMENTS {
        Some(path)
    } else {
        None
    }
}
