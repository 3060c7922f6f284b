use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use echome_newsletter::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    init_tracing();

    let paths = args.paths();

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Generate => {
            commands::generate::execute(&paths).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&paths).await?;
        }
        cli::Commands::Version => {
            println!("Echome Newsletter v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
