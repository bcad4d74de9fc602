mod commands;
mod logging;
mod model_args;

use clap::Parser;
use commands::Commands;

/// scriptorium
#[derive(clap::Parser, Debug)]
#[command(version = scriptorium::VERSION)]
pub struct Args {
    /// Subcommand to run.
    #[clap(subcommand)]
    pub command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.command.run()
}
