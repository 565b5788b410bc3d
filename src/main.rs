//! Reposcout CLI application entry point
//!
//! Searches GitHub repositories and shows results one page at a time, then
//! reads commands from an interactive prompt.
//!
//! # Usage
//!
//! ```bash
//! # Search "react" (the default term) sorted by stars
//! reposcout
//!
//! # Search by forks, ascending, 25 per page
//! reposcout tokio --sort forks --direction asc --page-size 25
//!
//! # Print one page and exit
//! reposcout tokio --once
//! ```
//!
//! # Configuration
//!
//! Settings are read from `~/.config/reposcout/config.toml` on Linux (or
//! `--config PATH`) and `REPOSCOUT_*` environment variables. The API token
//! is read from `GITHUB_TOKEN` unless `token_env` names another variable.

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use reposcout::{
    ScoutError,
    app::{SearchApp, View},
    cli::{Cli, ReplCommand},
    config::ScoutConfig,
    logging::{LogConfig, init_logging},
    output,
};
use std::io::{self, IsTerminal};
use std::time::Duration;

type Result<T> = std::result::Result<T, ScoutError>;

/// Extra time allowed past the HTTP timeout before giving up on a page
const WAIT_SLACK: Duration = Duration::from_secs(5);

/// Merge command-line overrides into the loaded configuration
fn effective_config(cli: &Cli) -> Result<ScoutConfig> {
    let mut config = ScoutConfig::load(cli.config.as_deref())?;
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(ordering) = cli.ordering {
        config.ordering = ordering.into();
    }
    config.validate()?;
    Ok(config)
}

fn handle_save_config(cli: &Cli, config: &ScoutConfig) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => ScoutConfig::config_path()?,
    };
    config.save_to(&path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

/// Wait for the current page and print it
fn render(app: &mut SearchApp, timeout: Duration) {
    let page_size = app.session().page_size();
    let page_number = app.session().page_number();
    let selected = app.session().selected().cloned();

    match app.wait(timeout) {
        View::Idle | View::Loading => println!("{}", "Still loading, try again shortly.".yellow()),
        View::Ready(projection) => {
            println!(
                "{}",
                output::results_table(projection, page_number, page_size, selected.as_ref())
            );
        }
        View::Failed { message, .. } => println!("{}", output::failure(message)),
    }
}

fn prompt_line(app: &SearchApp) -> Result<String> {
    let prompt = format!(
        "{} [{}]",
        app.session().committed_term(),
        app.session().sort_state()
    );
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ScoutError::IoError(io::Error::other(e)))
}

/// Read and apply prompt commands until `:q`
fn run_repl(app: &mut SearchApp, timeout: Duration) -> Result<()> {
    loop {
        let line = prompt_line(app)?;
        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message.red());
                continue;
            }
        };

        match command {
            ReplCommand::Quit => return Ok(()),
            ReplCommand::Help => println!("{}", output::help()),
            ReplCommand::Search(term) => {
                if app.submit(&term) {
                    render(app, timeout);
                } else {
                    println!("{}", "Already showing that search.".dimmed());
                }
            }
            ReplCommand::NextPage => {
                if app.next_page() {
                    render(app, timeout);
                } else {
                    println!("{}", "No next page.".dimmed());
                }
            }
            ReplCommand::PrevPage => {
                if app.prev_page() {
                    render(app, timeout);
                } else {
                    println!("{}", "No previous page.".dimmed());
                }
            }
            ReplCommand::Sort(field) => {
                app.sort(field);
                render(app, timeout);
            }
            ReplCommand::Open(row) => match app.select_row(row) {
                Some(node) => println!("{}", output::details(node)),
                None => println!("{}", format!("No row {row} on this page.").dimmed()),
            },
            ReplCommand::ClearSelection => {
                app.clear_selection();
                render(app, timeout);
            }
            ReplCommand::Retry => {
                app.retry();
                render(app, timeout);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_format(cli.log_format.into())
            .with_timestamps(cli.log_timestamps)
            .with_ansi(io::stderr().is_terminal()),
    )?;

    let config = effective_config(&cli)?;
    tracing::info!(endpoint = %config.endpoint, ordering = ?config.ordering, "configuration loaded");

    if cli.save_config {
        return handle_save_config(&cli, &config);
    }

    let timeout = Duration::from_secs(config.timeout_secs) + WAIT_SLACK;
    let mut app = SearchApp::from_config(&config, cli.term.as_deref(), cli.initial_sort())?;
    app.refresh();
    render(&mut app, timeout);

    if cli.once {
        if let View::Failed { error, .. } = app.view() {
            return Err(ScoutError::ApiError((**error).clone()));
        }
        return Ok(());
    }

    println!("{}", "Type :h for help.".dimmed());
    run_repl(&mut app, timeout)
}
