//! SegmentForge: customer segmentation dashboard entrypoint
//!
//! Loads the configuration, the dataset and the model pipeline once, then
//! runs the requested view or the interactive shell.

use anyhow::Result;
use clap::Parser;
use segmentforge::cli::{Args, Command};
use segmentforge::shell::run_shell;
use segmentforge::{check_schema, Dashboard, DashboardConfig, Session, FEATURES};
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    debug!(?config, "Configuration loaded");

    let start_time = Instant::now();
    let dashboard = Dashboard::load(config);
    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Startup resources loaded"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Home => {
            dashboard.startup_warnings(&mut out)?;
            dashboard.home(&mut out)?;
        }
        Command::Preview { rows } => {
            let rows = rows.unwrap_or(dashboard.config.preview_rows);
            dashboard.preview(&mut out, rows)?;
        }
        Command::Stats => dashboard.statistics(&mut out)?,
        Command::Eda { feature, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| dashboard.config.chart_dir.clone());
            dashboard.eda(&mut out, &feature, &out_dir)?;
        }
        Command::Predict(input) => match input.to_record() {
            Ok(record) => dashboard.predict_manual(&mut out, &record, input.format)?,
            Err(e) => segmentforge::output::print_error(&mut out, &e.to_string())?,
        },
        Command::Batch {
            input,
            output,
            rows,
        } => {
            let mut session = Session::new();
            dashboard.upload(&mut session, &mut out, &input)?;
            let ready = session
                .upload()
                .map_or(false, |upload| check_schema(&upload.batch, &FEATURES).is_empty());
            if ready {
                dashboard.run_prediction(&mut session, &mut out)?;
            }
            if session.results().is_some() {
                let rows = rows.unwrap_or(dashboard.config.preview_rows);
                dashboard.show_results(&session, &mut out, rows)?;
                dashboard.export(&session, &mut out, output.as_deref())?;
            }
        }
        Command::Shell => {
            let stdin = io::stdin();
            run_shell(&dashboard, stdin.lock(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Log to stderr; RUST_LOG wins over the verbose flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}
