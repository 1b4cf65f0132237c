//! mdsync CLI - Markdown and Confluence synchronizer.
//!
//! Provides commands for:
//! - `publish`: Create or update a Confluence page from a Markdown file
//! - `import`: Download Confluence pages as Markdown
//! - `convert`: Convert between Markdown and storage format offline

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, ImportArgs, PublishArgs};
use output::Output;

/// mdsync - Markdown and Confluence synchronizer.
#[derive(Parser)]
#[command(name = "mdsync", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a Markdown file as a child of a parent page.
    Publish(PublishArgs),
    /// Import Confluence pages as Markdown.
    Import(ImportArgs),
    /// Convert a document without contacting Confluence.
    Convert(ConvertArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(),
        Commands::Import(args) => args.execute(),
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
