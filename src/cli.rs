use crate::config::DialogConfig;
use crate::dialog::ConfirmDialog;
use crate::error::DialogError;
use crate::page::Page;
use crate::tui;
use crate::{log_debug, log_info};

use anyhow::{Context, Result};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, crate_version};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_FILE: &str = "confirm-dialog-debug.log";

/// Exit status when the user confirmed
pub const EXIT_CONFIRMED: u8 = 0;
/// Exit status when the user declined
pub const EXIT_DECLINED: u8 = 1;
/// Exit status when nobody answered in time
pub const EXIT_TIMED_OUT: u8 = 2;
/// Exit status for configuration or terminal errors
pub const EXIT_ERROR: u8 = 3;

/// CLI structure defining the available arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version = crate_version!(),
    about = "Ask a yes/no question in the terminal",
    long_about = "Shows MESSAGE in a confirmation panel and waits for an answer. \
                  Exits 0 when confirmed, 1 when declined and 2 on timeout.",
    styles = get_styles(),
)]
pub struct Cli {
    /// Prompt to display, shown verbatim
    #[arg(required_unless_present = "init_config")]
    pub message: Option<String>,

    /// Load configuration from this file instead of the user config
    #[arg(short = 'c', long = "config", help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(short = 't', long = "timeout", help = "Give up after this many seconds")]
    pub timeout: Option<u64>,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log", help = "Log debug messages to a file")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file", help = "Specify a custom log file path")]
    pub log_file: Option<String>,

    /// Write the default configuration to the user config file and exit
    #[arg(long = "init-config", help = "Write the default configuration and exit")]
    pub init_config: bool,
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

impl Cli {
    /// Resolve the configuration this invocation should use
    pub fn load_config(&self) -> Result<DialogConfig> {
        let mut config = match &self.config {
            Some(path) => DialogConfig::load_from(path)?,
            None => DialogConfig::load().context("Failed to load user configuration")?,
        };
        if self.timeout.is_some() {
            config.timeout_seconds = self.timeout;
        }
        Ok(config)
    }
}

/// Map a settled confirmation onto the process exit status
pub fn exit_status(outcome: Result<bool, DialogError>) -> Result<u8> {
    match outcome {
        Ok(true) => Ok(EXIT_CONFIRMED),
        Ok(false) => Ok(EXIT_DECLINED),
        Err(DialogError::TimedOut) => Ok(EXIT_TIMED_OUT),
        Err(e) => Err(e.into()),
    }
}

/// Main function to parse arguments and run the dialog
pub fn main() -> Result<ExitCode> {
    let cli = parse_args();

    crate::logger::init().map_err(|e| anyhow::anyhow!("{e}"))?;
    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)
            .with_context(|| format!("Failed to open log file {log_file}"))?;
    } else {
        crate::logger::disable_logging();
    }

    if cli.init_config {
        let path = DialogConfig::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.load_config()?;
    let message = cli.message.unwrap_or_default();
    let page = Page::with_dialog(&config.elements);
    let dialog = ConfirmDialog::from_config(page, &config);

    log_debug!("Asking: {:?}", message);
    let outcome = tui::run_confirm(&dialog, &message, config.timeout())?;
    log_info!("Confirmation finished: {:?}", outcome);

    exit_status(outcome).map(ExitCode::from)
}
