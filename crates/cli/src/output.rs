//! Rendering of results for the terminal.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use sheetseek_config::SourceConfig;
use sheetseek_core::{FieldConstraint, Record, SheetInfo, Table};
use sheetseek_session::{SearchOutcome, SearchSession};

/// Output format for results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Aligned `field: value` lines (default)
    #[default]
    Table,
}

pub fn print_config(config: &SourceConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(config)?;
            value["credentialRef"] = json!(config.masked_credential());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            let credential = config.masked_credential();
            let fields = config.last_selected_fields.join(", ");
            let rows = [
                ("source", config.source_id.as_str()),
                ("credential", credential.as_str()),
                ("relay", config.relay_url.as_deref().unwrap_or("(none)")),
                ("fields", fields.as_str()),
            ];
            print_pairs(rows.into_iter());
            if let Err(e) = config.ensure_complete() {
                println!("\n{} {}", "Note:".yellow().bold(), e.user_message());
            }
        }
    }
    Ok(())
}

pub fn print_sheets(sheets: &[SheetInfo], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(sheets)?),
        OutputFormat::Table => {
            if sheets.is_empty() {
                println!("(no sheets)");
            }
            for sheet in sheets {
                println!("{}  {}", sheet.id.dimmed(), sheet.name);
            }
        }
    }
    Ok(())
}

pub fn print_fields(session: &SearchSession, format: OutputFormat) -> Result<()> {
    let Some(loaded) = session.loaded() else {
        return Ok(());
    };
    let proposed = session.proposed_fields();
    match format {
        OutputFormat::Json => {
            let value = json!({
                "sheetName": loaded.table.sheet_name,
                "headers": loaded.table.headers,
                "detected": loaded.detected,
                "proposed": proposed,
                "records": loaded.table.record_count(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            if !loaded.detected.is_usable() {
                println!("{}", "(sheet has no headers; search disabled)".dimmed());
                return Ok(());
            }
            println!(
                "{} {} ({} records)",
                "Sheet:".bold(),
                loaded.table.sheet_name,
                loaded.table.record_count()
            );
            println!("{} {}", "Headers:".bold(), loaded.table.headers.join(", "));
            println!(
                "{} {} / {}",
                "Detected:".bold(),
                loaded.detected.primary.cyan(),
                loaded.detected.secondary.cyan()
            );
            println!("{} {}", "Search by:".bold(), proposed.join(", "));
        }
    }
    Ok(())
}

pub fn print_outcome(
    outcome: &SearchOutcome,
    constraints: &[FieldConstraint],
    table: Option<&Table>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Table => match outcome {
            SearchOutcome::Found(record) => print_record(record, table),
            SearchOutcome::NotFound => println!("{}", not_found_line(constraints).yellow()),
        },
    }
    Ok(())
}

fn not_found_line(constraints: &[FieldConstraint]) -> String {
    let query: Vec<String> = constraints.iter().map(ToString::to_string).collect();
    format!("No record matching {}", query.join(", "))
}

/// Print a record in header order.
fn print_record(record: &Record, table: Option<&Table>) {
    match table {
        Some(table) => {
            let mut seen = Vec::with_capacity(table.headers.len());
            let pairs = table.headers.iter().filter_map(|h| {
                if seen.contains(&h) {
                    return None;
                }
                seen.push(h);
                record.get(h).map(|v| (h.as_str(), v))
            });
            print_pairs(pairs);
        }
        None => print_pairs(record.iter()),
    }
}

fn print_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) {
    let pairs: Vec<_> = pairs.collect();
    let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, value) in pairs {
        let value = if value.is_empty() {
            "-".dimmed().to_string()
        } else {
            value.to_string()
        };
        println!("{:>width$}: {}", key.cyan().bold(), value, width = width);
    }
}
