use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "helm", version, about = "Helm focus timer and reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the long-lived host: session timer plus reminder poller
    Run(commands::run::RunArgs),
    /// Run a single reminder pass and exit
    Poll,
    /// Task and event management
    Item {
        #[command(subcommand)]
        action: commands::item::ItemAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // Logs go to stderr; stdout carries command output and mirror frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HELM_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Poll => commands::poll::run(),
        Commands::Item { action } => commands::item::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
