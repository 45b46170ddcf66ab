//! The `config` command

use clap::Args;

use crate::config::{ExportPaths, Settings};
use crate::error::ExportResult;

/// Arguments of `vault-pdf config`
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Write the current settings (defaults on first run) to disk
    #[arg(long)]
    pub init: bool,
}

/// Handle `vault-pdf config`
pub fn handle_config_command(
    paths: &ExportPaths,
    settings: &Settings,
    args: ConfigArgs,
) -> ExportResult<()> {
    if args.init {
        settings.save(paths)?;
        println!("Settings written to {}", paths.settings_file().display());
        println!();
    }

    println!("vault-pdf Configuration");
    println!("=======================");
    println!("Config directory: {}", paths.config_dir().display());
    println!("Cache directory:  {}", paths.cache_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Font directory:   {}", paths.font_dir().display());
    println!();
    println!("Settings:");
    println!("  Default layout:  {}", settings.default_layout);
    println!("  Mask passwords:  {}", settings.mask_passwords);
    println!("  CSV delimiter:   {:?}", settings.csv_delimiter);
    println!("  op binary:       {}", settings.op_binary);
    println!("  Detail workers:  {}", settings.effective_workers());
    match &settings.font_path {
        Some(font) => println!("  Font file:       {}", font.display()),
        None => println!("  Font file:       (auto)"),
    }
    println!("  Default output:  {}", settings.default_output);

    Ok(())
}
