//! Command-line parsing

use std::ffi::OsString;

use clap::Parser;

use crate::error::LockError;

/// Lock the terminal until the invoking user's password is typed
#[derive(Parser, Debug)]
#[command(name = "sflock")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Print version information and exit
    #[arg(short = 'v')]
    pub version: bool,
}

/// What the process was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Lock,
    Version,
}

impl Cli {
    /// Parse `args` (including the program name).
    ///
    /// Anything other than no arguments or a single `-v` is a usage error.
    pub fn parse_args<I, T>(args: I) -> Result<Command, LockError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|_| LockError::Usage)?;
        Ok(if cli.version {
            Command::Version
        } else {
            Command::Lock
        })
    }
}

/// Version banner printed by `-v`
pub fn version_string() -> String {
    format!("sflock-{}", env!("CARGO_PKG_VERSION"))
}
