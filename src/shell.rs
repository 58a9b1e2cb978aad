//! Line-oriented interactive session
//!
//! Reads one command per line and runs it to completion before reading the
//! next. The `Session` lives for the whole loop, so uploads and prediction
//! results persist between commands.

use crate::cli::parse_feature_values;
use crate::dashboard::Dashboard;
use crate::output::{print_error, print_info, OutputFormat};
use crate::session::{Session, View};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::debug;

const PROMPT: &str = "segmentforge> ";

const HELP: &str = "\
Commands:
  home                      welcome page
  preview [ROWS]            first dataset rows
  stats                     descriptive statistics
  eda [FEATURE]             render exploratory charts
  predict R F M I P S       predict one customer
  upload PATH               load a CSV batch
  clear                     forget the uploaded batch
  run                       predict clusters for the uploaded batch
  show [ROWS]               show prediction results
  export [PATH]             write results as CSV
  menu                      show the current view
  help                      this message
  quit                      leave the session";

/// Run the interactive loop until `quit` or end of input
pub fn run_shell<R: BufRead>(
    dashboard: &Dashboard,
    mut input: R,
    out: &mut dyn Write,
) -> crate::Result<()> {
    let mut session = Session::new();
    dashboard.startup_warnings(out)?;
    writeln!(out, "Type 'help' for the list of commands.")?;

    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let rest: Vec<&str> = words.collect();
        debug!(command, args = rest.len(), "Shell command");

        match command {
            "quit" | "exit" => break,
            "help" => writeln!(out, "{}", HELP)?,
            "menu" => writeln!(out, "Current view: {}", session.view().label())?,
            "home" => {
                session.set_view(View::Home);
                dashboard.home(out)?;
            }
            "preview" => {
                session.set_view(View::Preview);
                match parse_rows(&rest, dashboard.config.preview_rows) {
                    Ok(rows) => dashboard.preview(out, rows)?,
                    Err(e) => print_error(out, &e.to_string())?,
                }
            }
            "stats" => {
                session.set_view(View::Preview);
                dashboard.statistics(out)?;
            }
            "eda" => {
                session.set_view(View::Eda);
                let feature = rest.first().copied().unwrap_or("recency");
                dashboard.eda(out, feature, &dashboard.config.chart_dir)?;
            }
            "predict" => {
                session.set_view(View::Predict);
                match parse_feature_values(&rest.join(" ")) {
                    Ok(record) => dashboard.predict_manual(out, &record, OutputFormat::Table)?,
                    Err(e) => print_error(out, &e.to_string())?,
                }
            }
            "upload" => {
                session.set_view(View::Predict);
                match rest.first() {
                    Some(path) => dashboard.upload(&mut session, out, Path::new(path))?,
                    None => print_info(out, "Please upload a CSV file to start predicting.")?,
                }
            }
            "clear" => {
                session.clear_upload();
                print_info(out, "Upload cleared.")?;
            }
            "run" => dashboard.run_prediction(&mut session, out)?,
            "show" => match parse_rows(&rest, dashboard.config.preview_rows) {
                Ok(rows) => dashboard.show_results(&session, out, rows)?,
                Err(e) => print_error(out, &e.to_string())?,
            },
            "export" => {
                dashboard.export(&session, out, rest.first().map(Path::new))?;
            }
            other => print_error(out, &format!("Unknown command '{}', type 'help'", other))?,
        }
    }

    Ok(())
}

/// Optional row count argument; absent means `default`
fn parse_rows(args: &[&str], default: usize) -> crate::Result<usize> {
    match args.first() {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid row count '{}', expected a whole number", value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    #[test]
    fn test_parse_rows() {
        assert_eq!(parse_rows(&[], 10).unwrap(), 10);
        assert_eq!(parse_rows(&["25"], 10).unwrap(), 25);
        assert!(parse_rows(&["abc"], 10).is_err());
        assert!(parse_rows(&["-3"], 10).is_err());
    }

    #[test]
    fn test_invalid_row_count_is_reported() {
        let dashboard = Dashboard::with_resources(DashboardConfig::default(), None, None);
        let mut out = Vec::new();
        run_shell(&dashboard, "preview abc\nshow 1x\n".as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Invalid row count 'abc'"));
        assert!(text.contains("Invalid row count '1x'"));
        assert!(!text.contains("dataset is not available"));
    }
}

