pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "elogie",
    about = "Elogie operator CLI",
    long_about = "Inspect configuration, check readiness, and run the weekly kudos reminder.",
    after_help = "Examples:\n  elogie doctor --json\n  elogie config\n  elogie remind"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and the embedded give-kudos modal template")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "DM every human member of the kudos channel a reminder to send kudos")]
    Remind,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Remind => commands::remind::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
