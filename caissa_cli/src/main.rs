use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{fetch::FetchArgs, optimize::OptimizeArgs};

mod fetch;
mod optimize;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and cache travel information for every city pair of a
    /// roster
    Fetch {
        #[command(flatten)]
        args: FetchArgs,
    },
    /// Search for a minimal-travel season assignment
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Fetch { args } => fetch::run(args).await?,
        Commands::Optimize { args } => optimize::run(args).await?,
    }

    Ok(())
}
