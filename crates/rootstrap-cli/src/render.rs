use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::{self, IsTerminal};
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use rootstrap_core::PackageRecord;
use rootstrap_installer::{ApkProgress, ProgressCallback};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(is_terminal: bool, no_color: bool) -> OutputStyle {
    if is_terminal && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(io::stdout().is_terminal(), no_color_requested())
}

pub(crate) fn current_error_style() -> OutputStyle {
    resolve_output_style(io::stderr().is_terminal(), no_color_requested())
}

fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) struct ApkProgressView {
    progress_bar: Option<ProgressBar>,
}

impl ApkProgressView {
    pub fn start(style: OutputStyle, label: &str) -> Self {
        let progress_bar = (style == OutputStyle::Rich).then(|| {
            let progress_bar = ProgressBar::new(1);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.cyan.bold} {prefix:<10} [{bar:20.cyan/blue}] {pos:>3}/{len:3} {wide_msg}",
            ) {
                progress_bar.set_style(style.progress_chars("=>-"));
            }
            progress_bar.set_prefix(label.to_string());
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            progress_bar
        });
        Self { progress_bar }
    }

    pub fn callback(&self) -> Option<ProgressCallback> {
        let progress_bar = self.progress_bar.clone()?;
        Some(Box::new(move |progress: &ApkProgress<'_>| {
            match progress.step {
                Some((current, total)) => {
                    progress_bar.set_length(total.max(1));
                    progress_bar.set_position(current.min(total));
                    progress_bar.set_message(step_message(progress.line));
                }
                None => progress_bar.println(progress.line),
            }
        }))
    }

    pub fn finish(self) {
        if let Some(progress_bar) = self.progress_bar {
            progress_bar.finish_and_clear();
        }
    }
}

// `(3/12) Installing musl (1.2.4-r2)` -> `Installing musl (1.2.4-r2)`.
pub(crate) fn step_message(line: &str) -> String {
    line.trim_start()
        .split_once(") ")
        .map(|(_, message)| message)
        .unwrap_or(line)
        .trim()
        .to_string()
}

pub(crate) fn render_error_line(style: OutputStyle, err: &anyhow::Error) -> String {
    let label = match style {
        OutputStyle::Plain => "error:".to_string(),
        OutputStyle::Rich => colorize(error_style(), "error:"),
    };
    format!("{label} {err:#}")
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("{status} {message}"),
        OutputStyle::Rich => format!("{} {message}", colorize(status_style(), status)),
    }
}

pub(crate) fn format_installed_lines(installed: &BTreeMap<String, PackageRecord>) -> Vec<String> {
    installed
        .values()
        .map(|record| format!("{} {}", record.name, record.version))
        .collect()
}

pub(crate) fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}

fn error_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

fn status_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightGreen.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
