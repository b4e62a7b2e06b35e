//! KML Style Editor - inspect, edit, and re-export KML styles
//!
//! This application reads the `Style` and `StyleMap` elements of a KML file,
//! applies control edits, and writes the restyled document while leaving
//! every other node as it was.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kmlstyler::cli::{ConfigArgs, ExitCode, ExportArgs, FeaturesArgs, StylesArgs};

/// KML Style Editor - inspect, edit, and re-export KML styles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List parsed styles and style maps
    Styles(StylesArgs),
    /// List features with their resolved styles
    Features(FeaturesArgs),
    /// Apply style edits and export the KML file
    Export(ExportArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Styles(args) => args.execute(),
        Command::Features(args) => args.execute(),
        Command::Export(args) => args.execute(),
        Command::Config(args) => args.execute(),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code().code());
    }
    std::process::exit(ExitCode::Success.code());
}
