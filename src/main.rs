//! Binary entry point that glues configuration, logging and the SQLite-backed
//! catalog to the TUI. With `--import` it loads a seed file instead and exits
//! after printing a summary.
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use improvdb::logging::{effective_level, init_logging};
use improvdb::{import_resources, load_seed_file, open_database, run_app, App, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "improvdb", version, about = "Browse and curate an improv resource catalog")]
struct Cli {
    /// Configuration file (defaults to ~/.improvdb/config.toml).
    #[arg(long, value_name = "FILE", env = "IMPROVDB_CONFIG")]
    config: Option<PathBuf>,

    /// Import resources from a JSON seed file and exit.
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let level = effective_level(&config.log.level, cli.verbose);
    init_logging(&level, &config.log_path()?)?;

    let conn = open_database(&config.database_path()?)?;

    if let Some(seed) = cli.import {
        let resources = load_seed_file(&seed)?;
        let report = import_resources(&conn, &resources)?;
        println!("{}", report.summary());
        for id in &report.duplicates {
            println!("  duplicate: {id}");
        }
        for (id, reason) in &report.rejected {
            println!("  rejected: {id} ({reason})");
        }
        return Ok(());
    }

    info!("starting terminal UI");
    let mut app = App::new(conn, &config);
    run_app(&mut app)
}
