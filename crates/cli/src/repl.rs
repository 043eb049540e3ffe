//! Interactive search loop.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sheetseek_config::ConfigStore;
use sheetseek_core::{FieldConstraint, SeekError};
use sheetseek_session::{LoadOutcome, SearchSession};
use std::path::PathBuf;
use std::sync::Arc;

/// A parsed search line.
#[derive(Debug, PartialEq, Eq)]
enum Query {
    /// `FIELD=VALUE; FIELD=VALUE`
    Constraints(Vec<FieldConstraint>),
    /// A bare value for the first proposed field
    Value(String),
}

/// Parse a search line. Constraints are separated by `;` so field names and
/// values may contain spaces; surrounding whitespace is trimmed.
fn parse_query(line: &str) -> Result<Query, String> {
    let line = line.trim();
    if !line.contains('=') {
        return Ok(Query::Value(line.to_string()));
    }
    line.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<FieldConstraint>()
                .map(|c| FieldConstraint::new(c.field, c.value.trim()))
                .map_err(|e| e.to_string())
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Query::Constraints)
}

/// Run the REPL.
pub async fn run(store: Arc<dyn ConfigStore>, format: OutputFormat) -> Result<()> {
    println!(
        "{} {} - Interactive Search",
        "sheetseek".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "Type {} for help, {} to exit\n",
        ":help".yellow(),
        ":quit".yellow()
    );

    let mut session = match SearchSession::connect(store) {
        Ok(session) => session,
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e.user_message());
            println!("Run {} first.", "seek configure".yellow());
            return Ok(());
        }
    };

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs_history_path();

    // Load history if available
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        let prompt = match session.current_sheet() {
            Some(sheet) => format!("{}> ", sheet).green().bold().to_string(),
            None => "seek> ".green().bold().to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(command) = line.strip_prefix(':') {
                    let (name, arg) = command
                        .split_once(char::is_whitespace)
                        .map_or((command, ""), |(n, a)| (n, a.trim()));
                    match name {
                        "quit" | "q" | "exit" => break,
                        "help" | "h" | "?" => print_help(),
                        "sheets" | "ls" => match session.list_sheets().await {
                            Ok(sheets) => output::print_sheets(&sheets, format)?,
                            Err(e) => print_error(&e),
                        },
                        "sheet" | "use" => {
                            if arg.is_empty() {
                                println!("{} :sheet NAME", "Usage:".yellow().bold());
                            } else {
                                load_sheet(&mut session, arg, format).await?;
                            }
                        }
                        "fields" => {
                            if session.loaded().is_some() {
                                output::print_fields(&session, format)?;
                            } else {
                                print_error(&SeekError::NoSheetSelected);
                            }
                        }
                        "state" => println!("{}", session.state()),
                        "clear" => print!("\x1B[2J\x1B[1;1H"),
                        _ => println!("{} Unknown command: {}", "Error:".red().bold(), line),
                    }
                    continue;
                }

                let constraints = match parse_query(line) {
                    Ok(Query::Constraints(constraints)) => constraints,
                    Ok(Query::Value(value)) => {
                        session.value_constraint(&value).into_iter().collect()
                    }
                    Err(e) => {
                        println!("{} {e}", "Parse error:".red().bold());
                        continue;
                    }
                };
                match session.search(&constraints) {
                    Ok(outcome) => {
                        output::print_outcome(&outcome, &constraints, session.table(), format)?;
                    }
                    Err(e) => print_error(&e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {e}", "Error:".red().bold());
                break;
            }
        }
    }

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

async fn load_sheet(session: &mut SearchSession, sheet: &str, format: OutputFormat) -> Result<()> {
    match session.load_sheet(sheet).await {
        Ok(LoadOutcome::Ready) => output::print_fields(session, format)?,
        Ok(LoadOutcome::Unavailable { sheet }) => {
            print_error(&SeekError::not_found(sheet));
        }
        Ok(LoadOutcome::Stale) => {}
        Err(e) => print_error(&e),
    }
    Ok(())
}

fn print_error(err: &SeekError) {
    println!("{} {}", "Error:".red().bold(), err.user_message());
    if err.is_retryable() {
        println!("{}", "Use :sheet NAME again to retry.".dimmed());
    }
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("sheetseek");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  {}          list sheets", ":sheets".yellow());
    println!("  {}     load a sheet", ":sheet NAME".yellow());
    println!("  {}          show headers and search fields", ":fields".yellow());
    println!("  {}           show the session state", ":state".yellow());
    println!("  {}           clear the screen", ":clear".yellow());
    println!("  {}            exit", ":quit".yellow());
    println!();
    println!("{}", "Search:".bold());
    println!("  {}            match the first search field", "VALUE".yellow());
    println!("  {}  match every constraint", "FIELD=VALUE; ...".yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_value() {
        assert_eq!(
            parse_query("  Jane Roe "),
            Ok(Query::Value("Jane Roe".to_string()))
        );
    }

    #[test]
    fn test_parse_constraints() {
        assert_eq!(
            parse_query("Full Name = Jane Roe; Date of Birth=1980-02-03;"),
            Ok(Query::Constraints(vec![
                FieldConstraint::new("Full Name", "Jane Roe"),
                FieldConstraint::new("Date of Birth", "1980-02-03"),
            ]))
        );
    }

    #[test]
    fn test_parse_mixed_is_error() {
        assert!(parse_query("Name=Jane; Roe").is_err());
    }
}
