use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use omnipack_batch::BatchResults;
use omnipack_core::{MessageLevel, OutcomeStatus, PackageOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Plain,
    Rich,
}

pub fn current_output_style() -> OutputStyle {
    if std::io::stdout().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

fn colorize(style: Style, text: &str) -> String {
    format!("{style}{text}{style:#}")
}

fn status_style(status: OutcomeStatus) -> Style {
    match status {
        OutcomeStatus::Upgraded | OutcomeStatus::Installed => {
            AnsiColor::Green.on_default().effects(Effects::BOLD)
        }
        OutcomeStatus::Skipped => AnsiColor::Cyan.on_default(),
        OutcomeStatus::Failed => AnsiColor::Red.on_default().effects(Effects::BOLD),
        OutcomeStatus::Cancelled => AnsiColor::Yellow.on_default(),
    }
}

pub fn render_outcome_lines(style: OutputStyle, outcomes: &[PackageOutcome]) -> Vec<String> {
    let mut lines = Vec::new();
    for outcome in outcomes {
        // Pad before colorizing so the escape bytes do not eat into the
        // column width.
        let status = format!("{:<10}", outcome.status.as_str());
        let rendered_status = match style {
            OutputStyle::Plain => status,
            OutputStyle::Rich => colorize(status_style(outcome.status), &status),
        };
        let version = if outcome.version.is_empty() {
            String::new()
        } else {
            format!(" {}", outcome.version)
        };
        lines.push(format!("{rendered_status} {}{version}", outcome.identifier));
        for message in &outcome.messages {
            if message.level == MessageLevel::Info {
                continue;
            }
            lines.push(format!("  {}: {}", message.level.as_str(), message.text));
        }
    }
    lines
}

pub fn render_summary_line(results: &BatchResults) -> String {
    let outcomes = results.outcomes();
    let succeeded = outcomes.iter().filter(|outcome| outcome.success()).count();
    let failed = outcomes.len() - succeeded;
    if failed == 0 {
        format!("{succeeded} package(s) processed, no failures")
    } else {
        format!("{succeeded} package(s) processed, {failed} failed")
    }
}

pub fn render_json(results: &BatchResults) -> Result<String> {
    serde_json::to_string_pretty(&results.outcomes())
        .with_context(|| "failed rendering results as json")
}

pub fn batch_progress(style: OutputStyle, label: &str) -> Option<ProgressBar> {
    if style != OutputStyle::Rich {
        return None;
    }
    let progress_bar = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
        progress_bar.set_style(template);
    }
    progress_bar.set_message(label.to_string());
    progress_bar.enable_steady_tick(Duration::from_millis(80));
    Some(progress_bar)
}
