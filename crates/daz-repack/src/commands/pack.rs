use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use drp_package::{pack_product, InputSource, PackOutcome, PackageError};
use drp_registry::ProductRegistry;
use miette::Result;

use crate::errors::CliError;
use crate::println_pad;

/// Entries in the inputs directory that are never treated as products.
const IGNORED_INPUT_NAMES: [&str; 2] = [".DS_Store", "dummy.txt"];

#[derive(Debug, Clone)]
pub struct PackProductsArgs {
    pub inputs_dir: String,
    pub outputs_dir: String,
    pub registry_path: String,
}

/// Package every input currently in the inputs directory.
///
/// Failures local to one input are printed and the batch continues; registry
/// and output-storage failures abort the run, since further product
/// numbering would be unsafe.
pub fn pack_products(args: PackProductsArgs) -> Result<()> {
    let inputs_dir = Utf8PathBuf::from(&args.inputs_dir);
    let outputs_dir = Utf8PathBuf::from(&args.outputs_dir);
    let registry_path = Utf8PathBuf::from(&args.registry_path);

    if !inputs_dir.is_dir() {
        return Err(CliError::inputs_dir_missing(inputs_dir).into());
    }

    let mut registry = ProductRegistry::load(&registry_path)
        .map_err(|source| CliError::registry_unusable(registry_path.clone(), source))?;

    let inputs = discover_inputs(&inputs_dir)?;
    if inputs.is_empty() {
        println!(
            "{} {}",
            "Nothing to package in:".bright_yellow(),
            inputs_dir.as_str().bright_white().bold()
        );
        return Ok(());
    }

    println!(
        "{} {}",
        "📦 Packaging products from:".bright_blue().bold(),
        inputs_dir.as_str().bright_cyan().bold()
    );

    for input_path in inputs {
        match pack_one(&input_path, &outputs_dir, &mut registry) {
            Ok(PackOutcome::Packed {
                archive_path,
                sequence,
            }) => println_pad!(
                "{} {} {}",
                "✅ Packed:".bright_green().bold(),
                archive_path.as_str().bright_white().bold(),
                format!("(product #{})", sequence).dimmed()
            ),
            Ok(PackOutcome::AlreadyPackaged { archive_path }) => println_pad!(
                "{} {}",
                "⏭️  Already packaged:".bright_yellow(),
                archive_path.as_str().bright_white()
            ),
            Err(error) if error.is_local() => println_pad!(
                "{} {}",
                "⚠️  Skipped:".bright_yellow().bold(),
                error.to_string().bright_white()
            ),
            Err(error) => {
                return Err(CliError::packaging_aborted(input_path, error).into());
            }
        }
    }

    Ok(())
}

fn pack_one(
    input_path: &Utf8Path,
    outputs_dir: &Utf8Path,
    registry: &mut ProductRegistry,
) -> Result<PackOutcome, PackageError> {
    let source = InputSource::open(input_path)?;
    pack_product(&source, outputs_dir, registry)
}

/// List the packable entries of the inputs directory in sorted order,
/// skipping the system-file ignore list.
fn discover_inputs(inputs_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let entries = std::fs::read_dir(inputs_dir.as_std_path())
        .map_err(|source| CliError::inputs_dir_unreadable(inputs_dir.to_owned(), source))?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|source| CliError::inputs_dir_unreadable(inputs_dir.to_owned(), source))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if IGNORED_INPUT_NAMES.contains(&name.as_str()) {
            continue;
        }
        inputs.push(inputs_dir.join(name));
    }
    inputs.sort();
    Ok(inputs)
}
