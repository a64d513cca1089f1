//! gfmx CLI - GitHub Flavored Markdown toolkit.
//!
//! Provides commands for:
//! - `render`: Render Markdown to HTML
//! - `extensions`: List syntax extensions and which are enabled
//! - `outline`: Print the heading outline of a document

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExtensionsArgs, OutlineArgs, RenderArgs};
use output::Output;

/// gfmx - GitHub Flavored Markdown toolkit.
#[derive(Parser)]
#[command(name = "gfmx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render Markdown to HTML.
    Render(RenderArgs),
    /// List syntax extensions.
    Extensions(ExtensionsArgs),
    /// Print the heading outline of a document.
    Outline(OutlineArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Extensions(args) => args.execute(&output),
        Commands::Outline(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
