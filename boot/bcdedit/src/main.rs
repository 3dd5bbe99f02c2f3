//! bcdedit
//!
//! Creates, lists and edits BCD store images. Accepts bcdedit-style
//! `/switch` spellings alongside the usual `--switch` ones:
//!
//! ```text
//! bcdedit /createstore BCD
//! bcdedit /store BCD /create {bootmgr} --object-type 0x10100002 /d "Windows Boot Manager"
//! bcdedit /store BCD /set {bootmgr} 25000004 --type RegDword --value 30
//! bcdedit /store BCD /enum all
//! ```

mod cli;
mod commands;
mod input;
mod output;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use cli::Cli;

fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os()));
    init_logging(&cli);

    let stdout = io::stdout();
    match commands::run(cli, &mut stdout.lock()) {
        Ok(()) => {
            eprintln!("The operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
