use std::path::PathBuf;

use bagtrack::error::AppError;
use clap::{Args, Parser, Subcommand};

use crate::demo::{run_catalog_listing, run_demo, CatalogListingArgs, DemoArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Emergency Bag Tracker",
    about = "Track emergency bag contents, weight, and expirations from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the recommendation catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Run an end-to-end CLI demo covering items, alerts, and the sweep
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print catalog entries, optionally filtered
    List(CatalogListingArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Replace the built-in recommendation catalog with a CSV file
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog {
            command: CatalogCommand::List(args),
        } => run_catalog_listing(args),
        Command::Demo(args) => run_demo(args),
    }
}
