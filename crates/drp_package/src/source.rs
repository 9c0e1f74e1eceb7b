//! Product inputs: a raw directory tree or a single zip archive.

use std::fs::File;
use std::io::{self, Seek, Write};

use camino::{Utf8Path, Utf8PathBuf};
use drp_registry::Fingerprinter;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::PackageError;

/// File names never enumerated from directory inputs.
const IGNORED_TREE_FILES: [&str; 1] = [".DS_Store"];

/// Zip entry prefix produced by macOS archivers, never enumerated.
const MACOS_METADATA_PREFIX: &str = "__MACOSX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Directory,
    Archive,
}

/// One packable input discovered under the inputs directory.
#[derive(Debug)]
pub struct InputSource {
    path: Utf8PathBuf,
    kind: InputKind,
}

impl InputSource {
    /// Open an input, classifying it as a directory tree or a zip archive.
    /// Anything else is [`PackageError::UnreadableInput`].
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, PackageError> {
        let path = path.as_ref().to_owned();
        let kind = if path.is_dir() {
            InputKind::Directory
        } else if path.is_file() && has_zip_extension(&path) {
            InputKind::Archive
        } else {
            return Err(PackageError::UnreadableInput { path });
        };
        Ok(Self { path, kind })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Product display name: the input's file stem.
    pub fn product_name(&self) -> &str {
        self.path.file_stem().unwrap_or_else(|| self.path.as_str())
    }

    /// Enumerate the input's relative file paths. Directory trees are walked
    /// in sorted order; zip archives keep their entry order.
    pub fn entries(&self) -> Result<Vec<String>, PackageError> {
        match self.kind {
            InputKind::Directory => self.directory_entries(),
            InputKind::Archive => self.archive_entries(),
        }
    }

    /// Stream every entry's bytes, in enumeration order, into the
    /// fingerprinter. Read-only over the input.
    pub fn fold_entries(
        &self,
        entries: &[String],
        fingerprinter: &mut Fingerprinter,
    ) -> Result<(), PackageError> {
        match self.kind {
            InputKind::Directory => {
                for entry in entries {
                    let file = File::open(self.path.join(entry).as_std_path())?;
                    fingerprinter.fold(file)?;
                }
            }
            InputKind::Archive => {
                let mut archive = self.open_archive()?;
                for entry in entries {
                    let reader = archive.by_name(entry)?;
                    fingerprinter.fold(reader)?;
                }
            }
        }
        Ok(())
    }

    /// Copy each (raw, canonical) pair with a non-null canonical path into
    /// the output archive under the canonical name.
    pub fn copy_entries<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        read_paths: &[String],
        canonical_paths: &[Option<String>],
        options: SimpleFileOptions,
    ) -> Result<(), PackageError> {
        match self.kind {
            InputKind::Directory => {
                for (read_path, canonical) in read_paths.iter().zip(canonical_paths) {
                    let Some(canonical) = canonical else { continue };
                    zip.start_file(canonical.as_str(), options)?;
                    let mut file = File::open(self.path.join(read_path).as_std_path())?;
                    io::copy(&mut file, zip)?;
                }
            }
            InputKind::Archive => {
                let mut archive = self.open_archive()?;
                for (read_path, canonical) in read_paths.iter().zip(canonical_paths) {
                    let Some(canonical) = canonical else { continue };
                    zip.start_file(canonical.as_str(), options)?;
                    let mut entry = archive.by_name(read_path)?;
                    io::copy(&mut entry, zip)?;
                }
            }
        }
        Ok(())
    }

    fn directory_entries(&self) -> Result<Vec<String>, PackageError> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(self.path.as_std_path())
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !IGNORED_TREE_FILES.contains(&name))
            });

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(self.path.as_std_path())
                .map_err(io::Error::other)?;
            entries.push(relative.to_string_lossy().replace('\\', "/"));
        }
        Ok(entries)
    }

    fn archive_entries(&self) -> Result<Vec<String>, PackageError> {
        let mut archive = self.open_archive()?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            if entry.is_dir() || entry.name().starts_with(MACOS_METADATA_PREFIX) {
                continue;
            }
            entries.push(entry.name().to_string());
        }
        Ok(entries)
    }

    fn open_archive(&self) -> Result<ZipArchive<File>, PackageError> {
        Ok(ZipArchive::new(File::open(self.path.as_std_path())?)?)
    }
}

fn has_zip_extension(path: &Utf8Path) -> bool {
    path.extension()
        .map_or(false, |extension| extension.eq_ignore_ascii_case("zip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_file(root: &std::path::Path, relative: &str, bytes: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn directory_entries_are_sorted_and_skip_ignored_files() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Hero Pack");
        write_file(&root, "Content/Figures/Hero/hero.duf", b"duf");
        write_file(&root, "Content/Figures/Hero/.DS_Store", b"junk");
        write_file(&root, "Content/Figures/Alt/alt.duf", b"alt");

        let source = InputSource::open(root.to_str().unwrap()).unwrap();
        let entries = source.entries().unwrap();

        assert_eq!(
            entries,
            vec![
                "Content/Figures/Alt/alt.duf".to_string(),
                "Content/Figures/Hero/hero.duf".to_string(),
            ]
        );
    }

    #[test]
    fn archive_entries_skip_directories_and_macos_metadata() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("Hero Pack.zip");
        let mut zip = ZipWriter::new(File::create(&zip_path).unwrap());
        let options = SimpleFileOptions::default();
        zip.add_directory("Content/Figures", options).unwrap();
        zip.start_file("Content/Figures/hero.duf", options).unwrap();
        zip.write_all(b"duf").unwrap();
        zip.start_file("__MACOSX/Content/._hero.duf", options).unwrap();
        zip.write_all(b"resource fork").unwrap();
        zip.finish().unwrap();

        let source = InputSource::open(zip_path.to_str().unwrap()).unwrap();
        let entries = source.entries().unwrap();

        assert_eq!(entries, vec!["Content/Figures/hero.duf".to_string()]);
    }

    #[test]
    fn unreadable_input_is_rejected() {
        let dir = tempdir().unwrap();
        let stray = dir.path().join("notes.txt");
        std::fs::write(&stray, b"not a product").unwrap();

        let result = InputSource::open(stray.to_str().unwrap());
        assert!(matches!(result, Err(PackageError::UnreadableInput { .. })));
    }

    #[test]
    fn product_name_is_the_file_stem() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("My-Cool_Product v2.zip");
        let mut zip = ZipWriter::new(File::create(&zip_path).unwrap());
        zip.start_file("Content/Props/Chair/chair.duf", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"chair").unwrap();
        zip.finish().unwrap();

        let source = InputSource::open(zip_path.to_str().unwrap()).unwrap();
        assert_eq!(source.product_name(), "My-Cool_Product v2");
    }

    #[test]
    fn directory_and_archive_with_identical_bytes_fingerprint_identically() {
        let dir = tempdir().unwrap();

        let root = dir.path().join("Tree");
        write_file(&root, "Content/Props/Chair/chair.duf", b"chair bytes");

        let zip_path = dir.path().join("Tree.zip");
        let mut zip = ZipWriter::new(File::create(&zip_path).unwrap());
        zip.start_file("Content/Props/Chair/chair.duf", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"chair bytes").unwrap();
        zip.finish().unwrap();

        let tree = InputSource::open(root.to_str().unwrap()).unwrap();
        let archive = InputSource::open(zip_path.to_str().unwrap()).unwrap();

        let mut tree_fp = Fingerprinter::new();
        tree.fold_entries(&tree.entries().unwrap(), &mut tree_fp).unwrap();
        let mut archive_fp = Fingerprinter::new();
        archive
            .fold_entries(&archive.entries().unwrap(), &mut archive_fp)
            .unwrap();

        assert_eq!(tree_fp.finish(), archive_fp.finish());
    }
}
