use crate::service::{ServiceStatus, TableSource};
use chrono::{DateTime, Local, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalValue,
    Error,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Spinner shown while a fetch is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Formats an amount with thousands separators and at most `precision`
/// fraction digits, dropping trailing zeros.
pub fn format_amount(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", precision, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let is_zero = grouped.chars().all(|c| c == '0' || c == ',') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// `1 KRW = 0.00072 USD`
pub fn format_pair_rate(from: &str, to: &str, rate: f64) -> String {
    format!("1 {from} = {rate:.5} {to}")
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn source_label(source: TableSource) -> &'static str {
    match source {
        TableSource::Live => "live",
        TableSource::Cached => "saved",
        TableSource::Default => "built-in",
    }
}

/// One-paragraph summary of where the rates come from and how fresh they are.
pub fn format_status(status: &ServiceStatus, stale: bool) -> String {
    let headline = if status.is_offline {
        style_text(status.info_message(), StyleType::Warning)
    } else {
        style_text(status.info_message(), StyleType::Subtle)
    };
    let mut output = format!(
        "{}\nLast updated: {} ({} rates)",
        headline,
        format_timestamp(status.last_updated),
        source_label(status.table_source)
    );
    if stale {
        output.push_str(&format!(
            "\n{}",
            style_text("Rates may be out of date.", StyleType::Warning)
        ));
    }
    if let Some(message) = &status.error_message {
        output.push_str(&format!("\n{}", style_text(message, StyleType::Error)));
    }
    output
}
