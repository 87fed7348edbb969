//! Terminal rendering for oddsline commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Rows as a rounded table, or as a JSON array with `--json`.
pub fn print_rows<T: Tabled + Serialize>(rows: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => print_json(rows),
        OutputMode::Table if rows.is_empty() => {
            println!("(nothing to show)");
            Ok(())
        }
        OutputMode::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
            Ok(())
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `label: value`, label padded so consecutive fields line up.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{:<16} {}", format!("{label}:"), value);
}

pub fn print_success(msg: &str) {
    println!("\x1b[32m{msg}\x1b[0m");
}

/// Degraded but usable (stale data, retry pending).
pub fn print_warn(msg: &str) {
    eprintln!("\x1b[33m{msg}\x1b[0m");
}

pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m{msg}\x1b[0m");
}
