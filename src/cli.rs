//! Command-line interface definitions and parsing
//!
//! Two layers live here: the process arguments (`clap`) and the commands
//! typed at the interactive prompt.
//!
//! # Prompt commands
//!
//! - plain text: search for it
//! - `:n` / `:p`: next / previous page
//! - `:s <field>`: sort by `stars`, `forks` or `updated` (again to flip)
//! - `:o <row>`: show details of a row
//! - `:c`: clear the selection
//! - `:r`: retry the current request
//! - `:h`: help
//! - `:q`: quit
//!
//! # Examples
//!
//! ```
//! use reposcout::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["reposcout", "tokio", "--sort", "forks"]);
//! assert_eq!(cli.term.as_deref(), Some("tokio"));
//! ```

use crate::logging::LogFormat;
use crate::query::{OrderingStrategy, SortDirection, SortField, SortState};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Sort field accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Stars,
    Forks,
    Updated,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Stars => Self::Stars,
            SortArg::Forks => Self::Forks,
            SortArg::Updated => Self::UpdatedAt,
        }
    }
}

/// Sort direction accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Asc,
    Desc,
}

impl From<DirectionArg> for SortDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Asc => Self::Asc,
            DirectionArg::Desc => Self::Desc,
        }
    }
}

/// Ordering strategy accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingArg {
    /// `sort:` qualifier in the search text
    Qualifier,
    /// `orderBy` argument
    Argument,
    /// Sort each page locally
    Client,
}

impl From<OrderingArg> for OrderingStrategy {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Qualifier => Self::Qualifier,
            OrderingArg::Argument => Self::Argument,
            OrderingArg::Client => Self::Client,
        }
    }
}

/// Log output format accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "reposcout")]
#[command(about = "Search GitHub repositories from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Initial search term (defaults to the configured fallback term)
    #[arg(value_name = "TERM")]
    pub term: Option<String>,

    /// Initial sort field
    #[arg(short = 's', long = "sort", value_enum)]
    pub sort: Option<SortArg>,

    /// Initial sort direction
    #[arg(short = 'd', long = "direction", value_enum)]
    pub direction: Option<DirectionArg>,

    /// Results per page (1 to 100, overrides config)
    #[arg(short = 'n', long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,

    /// How sort order reaches the results (overrides config)
    #[arg(long = "ordering", value_enum)]
    pub ordering: Option<OrderingArg>,

    /// Config file to use instead of the default location
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long = "save-config")]
    pub save_config: bool,

    /// Print the first page and exit
    #[arg(long = "once")]
    pub once: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format on stderr
    #[arg(long = "log-format", value_enum, default_value = "compact")]
    pub log_format: LogFormatArg,

    /// Prefix log lines with timestamps
    #[arg(long = "log-timestamps")]
    pub log_timestamps: bool,
}

impl Cli {
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Initial sort order from `--sort` and `--direction`
    ///
    /// A field without a direction starts descending, like the default.
    #[must_use]
    pub fn initial_sort(&self) -> SortState {
        let default = SortState::default();
        SortState::new(
            self.sort.map_or(default.field, SortField::from),
            self.direction.map_or(default.direction, SortDirection::from),
        )
    }
}

/// One command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    NextPage,
    PrevPage,
    Sort(SortField),
    Open(usize),
    ClearSelection,
    Retry,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a prompt line
    ///
    /// # Errors
    ///
    /// Returns a message describing the problem for unknown commands or
    /// bad arguments.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Self::Search(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (name, arg) {
            ("n" | "next", None) => Ok(Self::NextPage),
            ("p" | "prev", None) => Ok(Self::PrevPage),
            ("s" | "sort", Some(field)) => field
                .parse::<SortField>()
                .map(Self::Sort)
                .map_err(|e| e.to_string()),
            ("s" | "sort", None) => Err("Usage: :s <stars|forks|updated>".to_string()),
            ("o" | "open", Some(row)) => row
                .parse::<usize>()
                .ok()
                .filter(|row| *row > 0)
                .map(Self::Open)
                .ok_or_else(|| format!("Invalid row '{row}'")),
            ("o" | "open", None) => Err("Usage: :o <row>".to_string()),
            ("c" | "clear", None) => Ok(Self::ClearSelection),
            ("r" | "retry", None) => Ok(Self::Retry),
            ("h" | "help" | "?", None) => Ok(Self::Help),
            ("q" | "quit", None) => Ok(Self::Quit),
            _ => Err(format!("Unknown command ':{command}'. Type :h for help.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["reposcout"]);
        assert!(cli.term.is_none());
        assert!(!cli.once);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.initial_sort(), SortState::default());
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Compact);
        assert!(!cli.log_timestamps);
    }

    #[test]
    fn test_parse_log_options() {
        let cli = Cli::parse_from(["reposcout", "--log-format", "json", "--log-timestamps"]);
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
        assert!(cli.log_timestamps);

        let cli = Cli::parse_from(["reposcout", "--log-format", "pretty"]);
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::Pretty);

        assert!(Cli::try_parse_from(["reposcout", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::parse_from([
            "reposcout",
            "tokio",
            "--sort",
            "updated",
            "--direction",
            "asc",
            "--page-size",
            "25",
            "--ordering",
            "client",
            "--once",
            "-vv",
        ]);
        assert_eq!(cli.term.as_deref(), Some("tokio"));
        assert_eq!(
            cli.initial_sort(),
            SortState::new(SortField::UpdatedAt, SortDirection::Asc)
        );
        assert_eq!(cli.page_size, Some(25));
        assert_eq!(cli.ordering.map(OrderingStrategy::from), Some(OrderingStrategy::Client));
        assert!(cli.once);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_sort_without_direction_is_desc() {
        let cli = Cli::parse_from(["reposcout", "-s", "forks"]);
        assert_eq!(
            cli.initial_sort(),
            SortState::new(SortField::Forks, SortDirection::Desc)
        );
    }

    #[test]
    fn test_bad_sort_rejected() {
        assert!(Cli::try_parse_from(["reposcout", "--sort", "watchers"]).is_err());
    }

    #[test]
    fn test_repl_plain_text_is_search() {
        assert_eq!(
            ReplCommand::parse("  rust lang "),
            Ok(ReplCommand::Search("rust lang".to_string()))
        );
        assert_eq!(ReplCommand::parse(""), Ok(ReplCommand::Search(String::new())));
    }

    #[test]
    fn test_repl_navigation() {
        assert_eq!(ReplCommand::parse(":n"), Ok(ReplCommand::NextPage));
        assert_eq!(ReplCommand::parse(":prev"), Ok(ReplCommand::PrevPage));
        assert_eq!(ReplCommand::parse(":q"), Ok(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse(":r"), Ok(ReplCommand::Retry));
        assert_eq!(ReplCommand::parse(":c"), Ok(ReplCommand::ClearSelection));
    }

    #[test]
    fn test_repl_sort() {
        assert_eq!(ReplCommand::parse(":s forks"), Ok(ReplCommand::Sort(SortField::Forks)));
        assert_eq!(
            ReplCommand::parse(":sort updated"),
            Ok(ReplCommand::Sort(SortField::UpdatedAt))
        );
        assert!(ReplCommand::parse(":s").is_err());
        assert!(ReplCommand::parse(":s watchers").is_err());
    }

    #[test]
    fn test_repl_open() {
        assert_eq!(ReplCommand::parse(":o 3"), Ok(ReplCommand::Open(3)));
        assert!(ReplCommand::parse(":o 0").is_err());
        assert!(ReplCommand::parse(":o x").is_err());
        assert!(ReplCommand::parse(":o").is_err());
    }

    #[test]
    fn test_repl_unknown() {
        let err = ReplCommand::parse(":zz").unwrap_err();
        assert!(err.contains(":zz"));
        assert!(ReplCommand::parse(":n 2").is_err());
    }
}
