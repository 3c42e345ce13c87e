//! sflock - lock the terminal until the invoking user's password is typed
//!
//! Startup order matters: the credential is read and privileges dropped
//! before any display resource is touched.

use std::io;
use std::panic;
use std::process::ExitCode;

use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, PopKeyboardEnhancementFlags},
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use sflock::{cli, Cli, Command, LockError, SystemVerifier, TerminalSurface, Theme};
use sflock_core::{run_session, LockConfig};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status for `-v`
const VERSION_EXIT: u8 = 1;

fn main() -> ExitCode {
    let command = match Cli::parse_args(std::env::args_os()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    if command == Command::Version {
        eprintln!("{}", cli::version_string());
        return ExitCode::from(VERSION_EXIT);
    }

    init_logging();
    install_panic_hook();

    match lock() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "sflock failed");
            eprintln!("sflock: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Acquire the credential, take over the terminal, and block until unlocked
fn lock() -> Result<(), LockError> {
    let verifier = SystemVerifier::acquire()?;
    let mut surface = TerminalSurface::create_fullscreen(Theme::default())?;

    let state = run_session(&mut surface, &verifier, &LockConfig::default())?;
    debug!(state = ?state, user = verifier.user(), "lock released");
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the default filter
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sflock=warn,sflock_core=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Restore the terminal before the default hook prints the panic
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            PopKeyboardEnhancementFlags,
            LeaveAlternateScreen,
            DisableMouseCapture,
            Show
        );
        original_hook(panic_info);
    }));
}
