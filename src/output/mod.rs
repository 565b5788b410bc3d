//! Output formatting for CLI display
//!
//! Everything here returns `String`s; printing is left to the caller.

use crate::model::{RepositoryId, RepositoryNode};
use crate::projection::Projection;
use crate::query::{SortDirection, SortField, SortState};
use colored::Colorize;

const NAME_WIDTH: usize = 32;
const DESCRIPTION_WIDTH: usize = 48;

/// Shorten `text` to at most `width` characters, marking the cut
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Column header, with an arrow on the active sort column
#[must_use]
pub fn column_header(field: SortField, sort: SortState) -> String {
    if field != sort.field {
        return field.label().to_string();
    }
    let arrow = match sort.direction {
        SortDirection::Asc => "↑",
        SortDirection::Desc => "↓",
    };
    format!("{}{arrow}", field.label())
}

/// "Page X of Y (N repositories)"
#[must_use]
pub fn page_status(projection: &Projection, page_number: u32, page_size: u32) -> String {
    format!(
        "Page {} of {} ({} repositories)",
        page_number,
        projection.page_count(page_size),
        projection.total_count
    )
}

/// Render a page as a numbered table
#[must_use]
pub fn results_table(
    projection: &Projection,
    page_number: u32,
    page_size: u32,
    selected: Option<&RepositoryId>,
) -> String {
    if projection.is_empty() {
        return "No repositories found.".yellow().to_string();
    }

    let sort = projection.sort;
    let mut lines = Vec::with_capacity(projection.items.len() + 2);
    lines.push(
        format!(
            "{:>3}  {:<name$}  {:>8}  {:>8}  {:<10}  {:<desc$}",
            "#",
            "Name",
            column_header(SortField::Stars, sort),
            column_header(SortField::Forks, sort),
            column_header(SortField::UpdatedAt, sort),
            "Description",
            name = NAME_WIDTH,
            desc = DESCRIPTION_WIDTH,
        )
        .bold()
        .to_string(),
    );

    for (index, node) in projection.items.iter().enumerate() {
        let line = format!(
            "{:>3}  {:<name$}  {:>8}  {:>8}  {:<10}  {}",
            index + 1,
            truncate(&node.name, NAME_WIDTH),
            node.stargazer_count,
            node.fork_count,
            node.updated_at.format("%Y-%m-%d"),
            truncate(node.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
            name = NAME_WIDTH,
        );
        if selected == Some(&node.id) {
            lines.push(line.reversed().to_string());
        } else {
            lines.push(line);
        }
    }

    lines.push(page_status(projection, page_number, page_size).dimmed().to_string());
    lines.join("\n")
}

/// Detail view of one repository
#[must_use]
pub fn details(node: &RepositoryNode) -> String {
    let mut lines = vec![node.name.bold().green().to_string()];
    if let Some(description) = &node.description {
        lines.push(description.clone());
    }
    lines.push(format!("  Stars:    {}", node.stargazer_count));
    lines.push(format!("  Forks:    {}", node.fork_count));
    lines.push(format!("  Updated:  {}", node.updated_at.to_rfc3339()));
    lines.push(format!(
        "  Language: {}",
        node.language_name().unwrap_or("unknown")
    ));
    lines.push(format!("  License:  {}", node.license_name().unwrap_or("none")));
    if let Some(url) = &node.url {
        lines.push(format!("  URL:      {}", url.cyan()));
    }
    lines.join("\n")
}

/// Error line for a failed request
#[must_use]
pub fn failure(message: &str) -> String {
    format!("{} {message} (:r to retry)", "Error:".red().bold())
}

#[must_use]
pub fn help() -> String {
    [
        "  <text>        search for <text> (blank searches the default term)",
        "  :n / :p       next / previous page",
        "  :s <field>    sort by stars, forks or updated (repeat to flip)",
        "  :o <row>      show details of a row",
        "  :c            clear the selection",
        "  :r            retry the current request",
        "  :q            quit",
    ]
    .join("\n")
}
