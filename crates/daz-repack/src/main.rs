use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{pack_products, registry_info, PackProductsArgs, RegistryInfoArgs};
use miette::Result;

mod commands;
mod errors;

/// Prints the provided lines indented under the current section.
#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package every product currently in the inputs directory
    Pack {
        /// The directory containing product inputs (directory trees or zip archives)
        #[arg(short, long, default_value = "Inputs")]
        inputs_dir: String,

        /// The directory to write product archives to
        #[arg(short, long, default_value = "Outputs")]
        outputs_dir: String,

        /// The path of the product registry store
        #[arg(short, long, default_value = "registry.json")]
        registry_path: String,
    },
    /// Show the product counter and every registered product
    Info {
        /// The path of the product registry store
        #[arg(short, long, default_value = "registry.json")]
        registry_path: String,
    },
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn main() -> Result<()> {
    let args = parse_args();

    match args.command {
        Commands::Pack {
            inputs_dir,
            outputs_dir,
            registry_path,
        } => pack_products(PackProductsArgs {
            inputs_dir,
            outputs_dir,
            registry_path,
        }),
        Commands::Info { registry_path } => registry_info(RegistryInfoArgs { registry_path }),
    }
}
