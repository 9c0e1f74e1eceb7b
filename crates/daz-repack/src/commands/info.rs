use camino::Utf8PathBuf;
use colored::Colorize;
use drp_registry::ProductRegistry;
use miette::Result;

use crate::errors::CliError;
use crate::println_pad;

pub struct RegistryInfoArgs {
    pub registry_path: String,
}

pub fn registry_info(args: RegistryInfoArgs) -> Result<()> {
    let registry_path = Utf8PathBuf::from(&args.registry_path);
    let registry = ProductRegistry::load(&registry_path)
        .map_err(|source| CliError::registry_unusable(registry_path.clone(), source))?;

    println!(
        "{} {}",
        "🗃️  Registry:".bright_blue().bold(),
        registry_path.as_str().bright_cyan().bold()
    );
    println_pad!(
        "{} {}",
        "🔢 Products minted:".bright_green(),
        registry.count().to_string().bright_white().bold()
    );

    if registry.entries().count() == 0 {
        println_pad!("{}", "No products registered yet.".dimmed());
        return Ok(());
    }

    println_pad!("\n{}", "📦 Registered products:".bright_magenta().bold());
    for (fingerprint, identity) in registry.entries() {
        println_pad!(
            "   {} {} {} {}",
            "•".bright_cyan(),
            format!("#{:07}", identity.sequence).bright_cyan().bold(),
            identity.product_name.bright_white().bold(),
            format!("({}.zip, {})", identity.archive_name, fingerprint).dimmed()
        );
    }

    Ok(())
}
