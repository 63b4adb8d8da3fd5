// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf, process::ExitCode};

use clap::{
    Arg, ArgAction, ArgMatches, Command, ValueHint, arg, builder::styling, crate_version,
    value_parser,
};
use colored::Colorize;
use duesync_core::{APP_NAME, Config};
use futures::{FutureExt, future::LocalBoxFuture};
use tracing_subscriber::EnvFilter;

use crate::cmd_calendars::CmdCalendars;
use crate::cmd_sync::{CmdOnce, CmdRun, DRY_RUN};
use crate::config::parse_config;

/// Run the duesync command-line interface.
///
/// Any error, including missing configuration, is printed and turned into a
/// failing exit code.
pub async fn run() -> ExitCode {
    init_tracing();
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Mirror due tasks from a Super Productivity export into a CalDAV calendar.")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // default to run
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Falls back to $DUESYNC_CONFIG, then to the WEBDAV_* / CALDAV_* \
environment variables, then to $XDG_CONFIG_HOME/duesync/config.toml.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .arg(
                Arg::new(DRY_RUN)
                    .long(DRY_RUN)
                    .help("Log what would be written without touching the calendar")
                    .action(ArgAction::SetTrue)
                    .global(true),
            )
            .subcommand(CmdRun::command())
            .subcommand(CmdOnce::command())
            .subcommand(CmdCalendars::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Ok(Self::from(&matches))
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Ok(Self::from(&matches))
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Self {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdRun::NAME, matches)) => Run(CmdRun::from(matches)),
            Some((CmdOnce::NAME, matches)) => Once(CmdOnce::from(matches)),
            Some((CmdCalendars::NAME, matches)) => Calendars(CmdCalendars::from(matches)),
            _ => Run(CmdRun::from(matches)),
        };

        let config = matches.get_one("config").cloned();
        Cli { config, command }
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone, Copy)]
pub enum Commands {
    /// Sync on a fixed interval
    Run(CmdRun),

    /// Sync once
    Once(CmdOnce),

    /// List calendars
    Calendars(CmdCalendars),
}

impl Commands {
    /// Run the command with the configuration at `config`, or the discovered one
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Run(a)       => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Once(a)      => Self::run_with(config, |x| a.run(x).boxed_local()).await,
            Calendars(a) => Self::run_with(config, |x| a.run(x).boxed_local()).await,
        }
    }

    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: FnOnce(Config) -> LocalBoxFuture<'static, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let config = parse_config(config).await?;
        f(config).await
    }
}
