//! Standalone CLI tool for dumping the SendTo+ menu as JSON.
//!
//! Builds the same tree the menu would show, without displaying anything.

use std::process::ExitCode;

use clap::Parser;
use sendto_cli::MenuArgs;
use sendto_core::config::SendToConfig;
use sendto_core::errors::SendToError;
use sendto_core::icon::NoIcons;
use sendto_core::menu::{snapshot, MenuBuilder, MenuSnapshot};

#[derive(Parser)]
#[command(name = "sendto-tree", about = "Dump the SendTo+ menu tree as JSON")]
struct Args {
    #[command(flatten)]
    menu: MenuArgs,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Resolve shell icons (reported as `has_icon`)
    #[cfg(windows)]
    #[arg(long)]
    icons: bool,
}

fn capture(args: &Args, config: &SendToConfig) -> Result<Vec<MenuSnapshot>, SendToError> {
    #[cfg(windows)]
    if args.icons {
        let shell = sendto_core::win32::ShellContext::new()?;
        let built = MenuBuilder::new(&shell, config).build(&config.root)?;
        return Ok(snapshot(&built.tree, &built.store));
    }
    #[cfg(not(windows))]
    let _ = args;

    let built = MenuBuilder::new(&NoIcons, config).build(&config.root)?;
    Ok(snapshot(&built.tree, &built.store))
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.menu.init_logging();

    let snapshots = match args.menu.config().and_then(|config| capture(&args, &config)) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            eprintln!("{}", sendto_cli::error_line("sendto-tree", &e));
            return ExitCode::FAILURE;
        }
    };

    let json = if args.compact {
        serde_json::to_string(&snapshots)
    } else {
        serde_json::to_string_pretty(&snapshots)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("sendto-tree: cannot serialise menu: {e}");
            ExitCode::FAILURE
        }
    }
}
