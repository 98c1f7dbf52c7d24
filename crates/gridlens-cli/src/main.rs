//! GridLens CLI - field profiling and pivot tables for tabular data.

mod cli;
mod commands;
mod store;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze { file, role, json } => commands::analyze::run(file, role, json, cli.verbose),

        Commands::Stats {
            file,
            field,
            max,
            json,
        } => commands::stats::run(file, field, max, json),

        Commands::Pivot {
            file,
            rows,
            cols,
            values,
            calcs,
            no_row_totals,
            no_col_totals,
            save,
            restore,
            json,
        } => commands::pivot::run(commands::pivot::PivotArgs {
            file,
            rows,
            cols,
            values,
            calcs,
            show_row_totals: !no_row_totals,
            show_col_totals: !no_col_totals,
            save,
            restore,
            json,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` turns on debug output.
fn init_logging(verbose: bool) {
    let default = if verbose { "gridlens=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
