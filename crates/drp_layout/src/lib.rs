//! Canonical DAZ content layout rules shared by the packager and the CLI.
//!
//! This crate owns the pure domain logic: locating the `Content` root inside
//! an arbitrarily nested input tree, rewriting file paths onto the installer
//! layout, and deriving output archive names from product display names.

mod naming;
mod resolve;

pub use naming::{archive_file_name, sanitize_display_name, ARCHIVE_PREFIX};
pub use resolve::{
    resolve_by_first_entry, ResolveError, CANONICAL_ROOT, CATEGORY_DIRS, MIN_CANONICAL_SEGMENTS,
    TOP_LEVEL_ROOTS,
};
