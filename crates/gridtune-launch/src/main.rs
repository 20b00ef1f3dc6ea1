use std::error::Error;

use clap::{Parser, Subcommand};

mod commands;
mod submit;

#[derive(Parser, Debug)]
#[command(name = "gridtune", about = "Resumable hyperparameter sweep launcher")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one scheduler job per remaining (configuration, run) pair.
    Launch(commands::launch::LaunchArgs),
    /// Read a reduced metric across stored results matching constraints.
    Read(commands::read::ReadArgs),
    /// Count completed runs stored for an exact configuration.
    Exists(commands::exists::ExistsArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Launch(args) => commands::launch::run(&args),
        Command::Read(args) => commands::read::run(&args),
        Command::Exists(args) => commands::exists::run(&args),
    }
}
