//! Arguments and setup shared by the `sendto` and `sendto-tree` binaries.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};
use sendto_core::config::{self, SendToConfig, SortOrder, DEFAULT_MAX_DEPTH};
use sendto_core::errors::SendToError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sort {
    Enumeration,
    Logical,
}

impl From<Sort> for SortOrder {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Enumeration => SortOrder::Enumeration,
            Sort::Logical => SortOrder::Logical,
        }
    }
}

/// Menu root, shape and logging flags.
#[derive(Debug, Args)]
pub struct MenuArgs {
    /// Menu root (default: the `sendto` folder next to the executable)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Number of menu levels, root included
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Entry order within each level
    #[arg(long, value_enum, default_value_t = Sort::Enumeration)]
    pub sort: Sort,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl MenuArgs {
    /// Install `env_logger`; `RUST_LOG` overrides the `-v` level.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }

    /// Validated configuration, rooted next to the running executable
    /// unless `--dir` says otherwise.
    pub fn config(&self) -> Result<SendToConfig, SendToError> {
        let exe = std::env::current_exe()
            .map_err(|e| SendToError::ConfigError(format!("cannot locate the executable: {e}")))?;
        self.config_for(&exe)
    }

    fn config_for(&self, exe: &std::path::Path) -> Result<SendToConfig, SendToError> {
        let root = config::resolve_root(self.dir.as_deref(), exe)?;
        let config = SendToConfig::new(root)
            .with_max_depth(self.max_depth)
            .with_sort(self.sort.into());
        config.validate()?;
        Ok(config)
    }
}

/// The single stderr line reported for a failed run.
pub fn error_line(program: &str, err: &SendToError) -> String {
    format!("{program}: {err}")
}
