// ===== cipherforge/src/main.rs =====
use clap::{Parser, Subcommand};
use std::process;
use tracing::Level;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the permutation space, resuming from saved state
    Run(cmd::run::RunArgs),
    /// Show saved generator progress
    Status(cmd::status::StatusArgs),
    /// Print the mapping for one ordinal
    Show(cmd::show::ShowArgs),
    /// Summarize the high-score log
    Results(cmd::results::ResultsArgs),
    /// Delete saved generator state
    Reset(cmd::reset::ResetArgs),
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let outcome = match cli.command {
        Commands::Run(args) => cmd::run::run(args),
        Commands::Status(args) => cmd::status::run(args),
        Commands::Show(args) => cmd::show::run(args),
        Commands::Results(args) => cmd::results::run(args),
        Commands::Reset(args) => cmd::reset::run(args),
    };

    if let Err(e) = outcome {
        eprintln!("\n❌ FATAL ERROR:");
        eprintln!("   {}", e);
        process::exit(1);
    }
}
