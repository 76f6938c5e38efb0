pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "catalog",
    about = "Product catalog operator CLI",
    long_about = "Inspect catalog configuration, run readiness checks, and review seed products.",
    after_help = "Examples:\n  catalog doctor --json\n  catalog config\n  catalog seed --dump"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, the SKU validator, and seed products")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Validate the seed products and summarize them")]
    Seed {
        #[arg(long, help = "Print the seed products as the JSON array clients receive")]
        dump: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Seed { dump } => commands::seed::run(dump),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
