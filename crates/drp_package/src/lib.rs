//! Packaging pipeline for DAZ Install Manager product archives.
//!
//! For one input the pipeline enumerates its files, resolves the canonical
//! `Content` layout, fingerprints the content bytes, obtains a product
//! identity from the registry (reusing a stored one when the fingerprint is
//! known) and assembles the output archive with the two install descriptor
//! documents embedded.

use camino::{Utf8Path, Utf8PathBuf};
use drp_layout::resolve_by_first_entry;
use drp_registry::{Fingerprinter, ProductRegistry};

pub mod descriptor;
mod error;
mod source;
mod writer;

pub use descriptor::{InstallManifest, ProductSupplement, MANIFEST_ENTRY_NAME, SUPPLEMENT_ENTRY_NAME};
pub use error::PackageError;
pub use source::InputSource;

/// Result of packaging one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    /// A new archive was written.
    Packed {
        archive_path: Utf8PathBuf,
        sequence: u64,
    },

    /// The destination archive already exists; the input was skipped.
    AlreadyPackaged { archive_path: Utf8PathBuf },
}

/// Package a single input into `outputs_dir`.
///
/// The registry is consulted by content fingerprint: a known fingerprint
/// reuses its stored identity without touching the counter, an unknown one
/// mints and durably records a new identity before any archive bytes are
/// written. Re-running over an unchanged input is a no-op once its archive
/// exists.
pub fn pack_product(
    source: &InputSource,
    outputs_dir: &Utf8Path,
    registry: &mut ProductRegistry,
) -> Result<PackOutcome, PackageError> {
    let read_paths = source.entries()?;
    if read_paths.is_empty() {
        return Err(PackageError::EmptyInput {
            path: source.path().to_owned(),
        });
    }

    let mut fingerprinter = Fingerprinter::new();
    source.fold_entries(&read_paths, &mut fingerprinter)?;
    let fingerprint = fingerprinter.finish();

    let identity = registry.get_or_create(fingerprint, source.product_name())?;
    let archive_path = outputs_dir.join(format!("{}.zip", identity.archive_name));
    if archive_path.exists() {
        return Ok(PackOutcome::AlreadyPackaged { archive_path });
    }

    let canonical_paths = resolve_by_first_entry(&read_paths).map_err(|_| {
        PackageError::NoCanonicalRoot {
            path: source.path().to_owned(),
        }
    })?;
    if canonical_paths.iter().all(Option::is_none) {
        return Err(PackageError::EmptyInput {
            path: source.path().to_owned(),
        });
    }

    let manifest = InstallManifest::from_canonical_entries(&canonical_paths);
    let supplement = ProductSupplement::new(source.product_name());

    std::fs::create_dir_all(outputs_dir.as_std_path())?;
    writer::write_archive(
        source,
        &archive_path,
        &read_paths,
        &canonical_paths,
        &manifest,
        &supplement,
    )?;

    Ok(PackOutcome::Packed {
        archive_path,
        sequence: identity.sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    struct Fixture {
        _dir: tempfile::TempDir,
        inputs: Utf8PathBuf,
        outputs: Utf8PathBuf,
        registry_path: Utf8PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let fixture = Fixture {
            inputs: root.join("Inputs"),
            outputs: root.join("Outputs"),
            registry_path: root.join("registry.json"),
            _dir: dir,
        };
        std::fs::create_dir_all(fixture.inputs.as_std_path()).unwrap();
        fixture
    }

    fn write_file(root: &Utf8Path, relative: &str, bytes: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap().as_std_path()).unwrap();
        std::fs::write(path.as_std_path(), bytes).unwrap();
    }

    fn write_product_tree(inputs: &Utf8Path, name: &str) -> Utf8PathBuf {
        let root = inputs.join(name);
        write_file(&root, "Content/Figures/Hero/hero.duf", b"hero bytes");
        write_file(&root, "Content/Runtime/Textures/hero.jpg", b"jpg bytes");
        write_file(&root, "Content/readme.txt", b"loose note");
        root
    }

    fn archive_entry_names(path: &Utf8Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path.as_std_path()).unwrap()).unwrap();
        (0..archive.len())
            .map(|index| archive.by_index(index).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn packs_a_directory_input_into_a_complete_archive() {
        let fixture = fixture();
        let product = write_product_tree(&fixture.inputs, "Hero Pack");
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();

        let source = InputSource::open(&product).unwrap();
        let outcome = pack_product(&source, &fixture.outputs, &mut registry).unwrap();

        let PackOutcome::Packed { archive_path, sequence } = outcome else {
            panic!("expected a packed outcome");
        };
        assert_eq!(sequence, 1);
        assert_eq!(
            archive_path.file_name(),
            Some("DZRP0000001-01_HeroPack.zip")
        );

        let names = archive_entry_names(&archive_path);
        assert!(names.contains(&"Content/Figures/Hero/hero.duf".to_string()));
        assert!(names.contains(&"Content/Runtime/Textures/hero.jpg".to_string()));
        assert!(names.contains(&MANIFEST_ENTRY_NAME.to_string()));
        assert!(names.contains(&SUPPLEMENT_ENTRY_NAME.to_string()));
        // The loose top-level note was dropped by the depth filter.
        assert!(!names.iter().any(|name| name.ends_with("readme.txt")));
    }

    #[test]
    fn second_run_over_an_unchanged_input_is_a_no_op() {
        let fixture = fixture();
        let product = write_product_tree(&fixture.inputs, "Hero Pack");
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();
        let source = InputSource::open(&product).unwrap();

        let first = pack_product(&source, &fixture.outputs, &mut registry).unwrap();
        let second = pack_product(&source, &fixture.outputs, &mut registry).unwrap();

        let PackOutcome::Packed { archive_path, .. } = first else {
            panic!("expected a packed outcome");
        };
        assert_eq!(
            second,
            PackOutcome::AlreadyPackaged {
                archive_path: archive_path.clone()
            }
        );
        assert_eq!(registry.count(), 1);

        let archives: Vec<_> = std::fs::read_dir(fixture.outputs.as_std_path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(archives, vec!["DZRP0000001-01_HeroPack.zip".to_string()]);
    }

    #[test]
    fn identical_content_under_a_new_name_reuses_the_identity() {
        let fixture = fixture();
        let original = write_product_tree(&fixture.inputs, "Hero Pack");
        let renamed = write_product_tree(&fixture.inputs, "Hero Pack Copy");
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();

        let first = InputSource::open(&original).unwrap();
        pack_product(&first, &fixture.outputs, &mut registry).unwrap();

        let second = InputSource::open(&renamed).unwrap();
        let outcome = pack_product(&second, &fixture.outputs, &mut registry).unwrap();

        // Same fingerprint, same identity: the archive minted for the first
        // input already exists, so the copy is skipped without re-minting.
        assert_eq!(
            outcome,
            PackOutcome::AlreadyPackaged {
                archive_path: fixture.outputs.join("DZRP0000001-01_HeroPack.zip")
            }
        );
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn zip_input_is_repackaged_under_canonical_paths() {
        let fixture = fixture();
        let zip_path = fixture.inputs.join("Loose Poses.zip");
        std::fs::create_dir_all(fixture.inputs.as_std_path()).unwrap();
        let mut zip = zip::ZipWriter::new(File::create(zip_path.as_std_path()).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("randomfolder/People/Genesis/pose.duf", options).unwrap();
        std::io::Write::write_all(&mut zip, b"pose bytes").unwrap();
        zip.finish().unwrap();

        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();
        let source = InputSource::open(&zip_path).unwrap();
        let outcome = pack_product(&source, &fixture.outputs, &mut registry).unwrap();

        let PackOutcome::Packed { archive_path, .. } = outcome else {
            panic!("expected a packed outcome");
        };
        assert_eq!(
            archive_path.file_name(),
            Some("DZRP0000001-01_LoosePoses.zip")
        );

        let names = archive_entry_names(&archive_path);
        assert!(names.contains(&"Content/People/Genesis/pose.duf".to_string()));

        let mut archive = ZipArchive::new(File::open(archive_path.as_std_path()).unwrap()).unwrap();
        let mut copied = Vec::new();
        archive
            .by_name("Content/People/Genesis/pose.duf")
            .unwrap()
            .read_to_end(&mut copied)
            .unwrap();
        assert_eq!(copied, b"pose bytes");
    }

    #[test]
    fn unresolvable_input_fails_with_no_canonical_root() {
        let fixture = fixture();
        let root = fixture.inputs.join("Not A Product");
        write_file(&root, "docs/manual.pdf", b"pdf bytes");
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();

        let source = InputSource::open(&root).unwrap();
        let result = pack_product(&source, &fixture.outputs, &mut registry);

        assert!(matches!(
            result,
            Err(PackageError::NoCanonicalRoot { .. })
        ));
    }

    #[test]
    fn input_with_only_shallow_entries_is_empty() {
        let fixture = fixture();
        let root = fixture.inputs.join("Shallow");
        write_file(&root, "Content/readme.txt", b"note");
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();

        let source = InputSource::open(&root).unwrap();
        let result = pack_product(&source, &fixture.outputs, &mut registry);

        assert!(matches!(result, Err(PackageError::EmptyInput { .. })));
    }

    #[test]
    fn empty_directory_input_is_empty() {
        let fixture = fixture();
        let root = fixture.inputs.join("Empty");
        std::fs::create_dir_all(root.as_std_path()).unwrap();
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();

        let source = InputSource::open(&root).unwrap();
        let result = pack_product(&source, &fixture.outputs, &mut registry);

        assert!(matches!(result, Err(PackageError::EmptyInput { .. })));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn no_temporary_files_remain_after_packing() {
        let fixture = fixture();
        let product = write_product_tree(&fixture.inputs, "Hero Pack");
        let mut registry = ProductRegistry::load(&fixture.registry_path).unwrap();

        let source = InputSource::open(&product).unwrap();
        pack_product(&source, &fixture.outputs, &mut registry).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(fixture.outputs.as_std_path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| !name.ends_with(".zip"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected leftovers: {:?}", leftovers);
    }
}
