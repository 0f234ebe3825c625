//! Synthdef CLI - compile, inspect, and list synth definitions.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synthdef")]
#[command(author, version, about = "Synth definition compiler", long_about = None)]
struct Cli {
    /// Log graph building and encoding at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a definition to a .scsyndef file
    Compile(commands::compile::CompileArgs),

    /// Decode a .scsyndef file and print its contents
    Inspect(commands::inspect::InspectArgs),

    /// List factory definitions
    List(commands::list::ListArgs),

    /// List available unit generators and their arguments
    Ugens(commands::ugens::UgensArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile(args) => commands::compile::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Ugens(args) => commands::ugens::run(args),
    }
}
