pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod join;
pub mod outliers;
pub mod parquet_sink;
pub mod pipeline;
pub mod preview;
pub mod quality;
pub mod schema;
pub mod table;
pub mod temporal;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("order_analytics", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Build(args) => pipeline::execute(&args),
        Commands::Missing(args) => handle_missing(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

fn handle_missing(args: &cli::MissingArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let loaded = io_utils::read_csv_table(&args.input, args.delimiter, encoding)?;
    let report = quality::missingness_report(&loaded);
    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Serializing missingness report")?;
        println!("{rendered}");
    } else {
        let headers = vec![
            "column".to_string(),
            "n_missing".to_string(),
            "p_missing".to_string(),
        ];
        table::print_table(&headers, &quality::render_missingness_rows(&report));
    }
    info!(
        "Reported missingness for {} column(s) over {} row(s) from {:?}",
        report.len(),
        loaded.height(),
        args.input
    );
    Ok(())
}
