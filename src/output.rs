//! Terminal presentation helpers shared by the CLI commands.
//!
//! Color handling follows the NO_COLOR standard (https://no-color.org/) and the
//! traditional CLICOLOR conventions:
//! - `NO_COLOR` set: no colors
//! - `CLICOLOR_FORCE` non-zero: colors even when not a TTY
//! - `CLICOLOR=0`: no colors
//! - otherwise: colors only when stdout is a terminal

use crate::pagination::Paginator;
use colored::{Colorize, control};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Configure `colored` from the environment. Call once, early in `main`.
pub fn init_colors() {
    let var = |key: &str| std::env::var(key).ok();
    control::set_override(colors_enabled(
        var("NO_COLOR").is_some(),
        var("CLICOLOR_FORCE").as_deref(),
        var("CLICOLOR").as_deref(),
        std::io::stdout().is_terminal(),
    ));
}

fn colors_enabled(
    no_color: bool,
    clicolor_force: Option<&str>,
    clicolor: Option<&str>,
    is_tty: bool,
) -> bool {
    if no_color {
        return false;
    }
    if clicolor_force.is_some_and(|v| v != "0") {
        return true;
    }
    if clicolor == Some("0") {
        return false;
    }
    is_tty
}

pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// A steady spinner on a TTY, a hidden bar otherwise.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    if !stdout_is_tty() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Cut `text` to at most `max` characters, ending in `…` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// `‹ 3 4 [5] 6 7 ›` style page strip; plain text, colored by the caller.
pub fn page_strip(paginator: &Paginator, radius: usize) -> String {
    let current = paginator.current_page();
    let last = paginator.total_pages().max(1);

    let mut parts = Vec::new();
    parts.push(if current > 1 { "‹" } else { " " }.to_string());
    for page in paginator.page_window(radius) {
        if page == current {
            parts.push(format!("[{page}]"));
        } else {
            parts.push(page.to_string());
        }
    }
    parts.push(if current < last { "›" } else { " " }.to_string());
    parts.join(" ")
}

/// `Page 2 of 7 (150 items)`.
pub fn page_summary(paginator: &Paginator) -> String {
    format!(
        "Page {} of {} ({} items)",
        paginator.current_page(),
        paginator.total_pages().max(1),
        paginator.total_items()
    )
}

/// Badge for deprecated / disabled packages.
pub fn status_badge(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("[{}]", reason.to_lowercase()).red().to_string(),
        None => String::new(),
    }
}

/// `Label: value`, with the label in bold.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", label.bold(), value);
}
