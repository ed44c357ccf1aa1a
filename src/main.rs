use std::process::ExitCode;

use clap::Parser;

use autobounds_launcher::SessionKind;

mod cli;
mod commands;
mod doctor;
mod warnings;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(mode) = cli.color {
        autobounds_launcher::set_color_mode(mode);
    }
    autobounds_launcher::telemetry_init(cli.verbose);

    match &cli.command {
        None => commands::run_startup_check(&cli),
        Some(Command::Check { json, no_prompt }) => commands::run_check(&cli, *json, *no_prompt),
        Some(Command::Pull) => commands::run_pull(&cli),
        Some(Command::Repl { args }) => commands::run_session(&cli, SessionKind::Repl, args),
        Some(Command::Notebook { args }) => {
            commands::run_session(&cli, SessionKind::Notebook, args)
        }
        Some(Command::Doctor) => commands::run_doctor_command(&cli),
        Some(Command::ResetPrompt) => commands::run_reset_prompt(&cli),
    }
}
