//! The CLI for `stax`.

use crate::{
    errors::{StError, StResult},
    subcommands::Subcommands,
};
use clap::{
    builder::styling::{AnsiColor, Color, Style},
    error::ErrorKind,
    ArgAction, CommandFactory, Parser,
};
use std::{ffi::OsString, process::ExitCode};
use tracing::Level;

const ABOUT: &str = "stax is a CLI application for working with stacks of dependent branches and their pull requests.";

/// The CLI application for `stax`.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(about = ABOUT, version, styles = cli_styles())]
pub struct Cli {
    /// Verbosity level (0-4)
    #[arg(short, action = ArgAction::Count, global = true)]
    pub v: u8,
    /// The subcommand to run
    #[clap(subcommand)]
    pub subcommand: Option<Subcommands>,
}

impl Cli {
    /// Parses `args`, printing help, version, or usage errors.
    ///
    /// Usage errors map to exit code `1`; clap's own `2` is reserved for a partial `sync`.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, ExitCode>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            }
        })
    }

    /// Run the CLI application with the given arguments.
    pub async fn run(self) -> StResult<ExitCode> {
        match self.subcommand {
            Some(subcommand) => subcommand.run().await,
            None => {
                Self::command().print_help()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    /// Initializes the tracing subscriber
    ///
    /// # Returns
    /// - `StResult<Self>` - Ok if successful, Err otherwise.
    pub(crate) fn init_tracing_subscriber(self) -> StResult<Self> {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(match self.v {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            })
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| StError::Io(std::io::Error::other(e)))?;

        Ok(self)
    }
}

/// Styles for the CLI application.
const fn cli_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}
