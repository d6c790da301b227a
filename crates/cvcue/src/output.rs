//! Output formatting: JSON, table, compact lines, counts.
//!
//! Turns a `RenderableOutput` into text. Tables use `tabled`, JSON uses
//! serde_json, status lines get owo-colors glyphs when color is enabled.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use cvcue_core::{CompactListing, DeviceTable, RenderableOutput};

use crate::cli::ColorMode;
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

pub fn success(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "✓".green().bold())
    } else {
        format!("✓ {message}")
    }
}

pub fn warning(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "✗".yellow().bold())
    } else {
        format!("✗ {message}")
    }
}

pub fn hint(message: &str, color: bool) -> String {
    if color {
        message.dimmed().to_string()
    } else {
        message.to_owned()
    }
}

// ── Render dispatcher ────────────────────────────────────────────────

/// Render a projected result set. `Raw` becomes pretty JSON.
pub fn render(output: &RenderableOutput) -> Result<String, CliError> {
    Ok(match output {
        RenderableOutput::Raw(records) => render_json(records)?,
        RenderableOutput::Table(table) => render_table(table),
        RenderableOutput::Compact(listing) => render_compact(listing),
        RenderableOutput::Count(n) => format!("Total devices: {n}"),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

fn render_table(table: &DeviceTable) -> String {
    if table.rows.is_empty() {
        return "No devices found".into();
    }

    let mut builder = Builder::default();
    builder.push_record(DeviceTable::headers());
    for row in &table.rows {
        builder.push_record(row.iter().enumerate().map(|(i, cell)| {
            if DeviceTable::headers().nth(i) == Some("Active") {
                active_glyph(cell).to_owned()
            } else {
                cell.clone()
            }
        }));
    }

    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    rendered.to_string()
}

fn active_glyph(cell: &str) -> &str {
    match cell {
        "true" => "✓",
        "false" => "✗",
        other => other,
    }
}

fn render_compact(listing: &CompactListing) -> String {
    listing
        .lines
        .iter()
        .map(|line| format!("{} - {}", line.name, line.mac))
        .collect::<Vec<_>>()
        .join("\n")
}
