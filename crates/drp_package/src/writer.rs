//! Output archive assembly.

use std::io::Write;

use camino::Utf8Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::descriptor::{
    InstallManifest, ProductSupplement, MANIFEST_ENTRY_NAME, SUPPLEMENT_ENTRY_NAME,
};
use crate::error::PackageError;
use crate::source::InputSource;

/// Write the output archive for one product: every installable entry under
/// its canonical path, then the two descriptor documents.
///
/// The archive is assembled in a temporary file next to the destination and
/// renamed into place on completion, so an interrupted run never leaves a
/// partial archive that a later run would mistake for a finished one.
pub fn write_archive(
    source: &InputSource,
    destination: &Utf8Path,
    read_paths: &[String],
    canonical_paths: &[Option<String>],
    manifest: &InstallManifest,
    supplement: &ProductSupplement,
) -> Result<(), PackageError> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let temp = NamedTempFile::new_in(directory.as_std_path())?;

    let mut zip = ZipWriter::new(temp);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    source.copy_entries(&mut zip, read_paths, canonical_paths, options)?;

    zip.start_file(MANIFEST_ENTRY_NAME, options)?;
    zip.write_all(manifest.to_xml()?.as_bytes())?;

    zip.start_file(SUPPLEMENT_ENTRY_NAME, options)?;
    zip.write_all(supplement.to_xml()?.as_bytes())?;

    let temp = zip.finish()?;
    temp.persist(destination.as_std_path()).map_err(|err| err.error)?;
    Ok(())
}
