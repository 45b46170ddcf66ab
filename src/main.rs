use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vault_pdf_export::cli::{
    handle_config_command, handle_export_command, handle_vaults_command, ConfigArgs, ExportArgs,
};
use vault_pdf_export::config::{ExportPaths, Settings};

#[derive(Parser)]
#[command(
    name = "vault-pdf",
    author = "Kaylee Beyene",
    version,
    about = "Export password-manager entries into a password-protected PDF",
    long_about = "vault-pdf reads entries from the 1Password CLI, a CSV export, or a \
                  1PUX archive, filters them by vault and search text, and writes a \
                  paginated PDF that only opens with the password you choose."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export entries to a protected PDF
    Export(ExportArgs),

    /// List vault names from the op CLI
    Vaults,

    /// Show current configuration and paths
    Config(ConfigArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = ExportPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Export(args)) => {
            let summary = handle_export_command(&paths, &settings, args)?;
            if summary.skipped > 0 {
                eprintln!("Skipped {} item(s) that could not be read.", summary.skipped);
            }
            eprintln!(
                "Exported {} of {} entries on {} page(s).",
                summary.exported, summary.loaded, summary.pages
            );
            println!("OK: {}", summary.output.display());
        }
        Some(Commands::Vaults) => handle_vaults_command(&settings)?,
        Some(Commands::Config(args)) => handle_config_command(&paths, &settings, args)?,
        None => {
            println!("vault-pdf - export password-manager entries to a protected PDF");
            println!();
            println!("Run 'vault-pdf --help' for usage information.");
            println!("Run 'vault-pdf export' to start an interactive export.");
        }
    }

    Ok(())
}
