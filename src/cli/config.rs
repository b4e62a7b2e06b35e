//! Configuration management CLI commands.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::Config;
use clap::{Args, Subcommand};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the configuration file path
    Path,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Path => {
                let path = Config::config_file_path()
                    .map_err(|e| CliError::io(format!("{e:#}")))?;
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config()?;

        if self.json {
            print_json(&config)
        } else {
            output_human_readable(&config);
            Ok(())
        }
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("Export:");
    println!("  Suffix:         {}", config.export.suffix);
    println!("  Fallback stem:  {}", config.export.fallback_stem);
    println!(
        "  Output dir:     {}",
        config
            .export
            .output_dir
            .as_ref()
            .map_or_else(|| "(next to input)".to_string(), |p| p.display().to_string())
    );
    println!();
    println!("Render:");
    println!(
        "  Label font:     {}px {}",
        config.render.label_font_size, config.render.label_font_family
    );
    println!(
        "  Label halo:     {} width {}",
        config.render.label_halo_color, config.render.label_halo_width
    );
    println!("  Label offset y: {}", config.render.label_offset_y);
    println!();
    println!("Map:");
    println!("  Projection:     {}", config.map.projection.code());
}
