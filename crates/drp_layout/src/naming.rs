//! Output archive naming.

use regex::Regex;

/// Prefix of every generated archive name.
pub const ARCHIVE_PREFIX: &str = "DZRP";

/// Strip every non-alphanumeric character (including hyphens, underscores
/// and spaces) from a product display name.
pub fn sanitize_display_name(name: impl AsRef<str>) -> String {
    Regex::new(r"[\W_]")
        .unwrap()
        .replace_all(name.as_ref(), "")
        .into_owned()
}

/// Derive the output archive file stem for a minted product sequence number
/// and display name. The `.zip` extension is appended by the archive writer.
pub fn archive_file_name(sequence: u64, display_name: impl AsRef<str>) -> String {
    format!(
        "{}{:07}-01_{}",
        ARCHIVE_PREFIX,
        sequence,
        sanitize_display_name(display_name)
    )
}
