#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]
//! SendTo+ launcher: show the menu at the cursor and send files to the
//! chosen target.
//!
//! With no FILES the chosen target is opened instead.  Root-level failures
//! are shown in an error box; everything else only reaches the log.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sendto_cli::MenuArgs;
use sendto_core::errors::SendToError;

#[derive(Parser)]
#[command(name = "sendto", about = "Show the SendTo+ menu and send files to the chosen target")]
struct Args {
    #[command(flatten)]
    menu: MenuArgs,

    /// Files to send; relative paths are taken from the current directory
    files: Vec<PathBuf>,
}

fn absolute_sources(files: &[PathBuf]) -> Result<Vec<PathBuf>, SendToError> {
    files
        .iter()
        .map(|file| {
            std::path::absolute(file).map_err(|e| {
                SendToError::ConfigError(format!("bad path '{}': {e}", file.display()))
            })
        })
        .collect()
}

#[cfg(windows)]
fn run(args: &Args) -> Result<(), SendToError> {
    let config = args.menu.config()?;
    let sources = absolute_sources(&args.files)?;

    let shell = sendto_core::win32::ShellContext::new()?;
    let outcome = sendto_core::session::run(&shell, &config, &sources)?;
    log::info!("session finished: {outcome:?}");
    Ok(())
}

#[cfg(not(windows))]
fn run(args: &Args) -> Result<(), SendToError> {
    let config = args.menu.config()?;
    absolute_sources(&args.files)?;
    Err(SendToError::ComError(format!(
        "showing the menu for {} needs the Windows shell; try sendto-tree",
        config.root.display()
    )))
}

#[cfg(windows)]
fn report(err: &SendToError) {
    log::error!("{err}");
    if err.is_user_visible() {
        sendto_core::win32::show_error(err);
    }
}

#[cfg(not(windows))]
fn report(err: &SendToError) {
    eprintln!("{}", sendto_cli::error_line("sendto", err));
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.menu.init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
