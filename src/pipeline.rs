//! End-to-end analytics build: load, type, derive, flag, join, sort, write.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::BuildArgs,
    config::PipelineConfig,
    error::PipelineResult,
    frame::{SortOrder, Table},
    io_utils,
    join::{JoinOptions, safe_left_join},
    outliers::{add_outlier_flag, iqr_bounds, winsorize},
    parquet_sink,
    schema::{ColumnType, coerce_column, enforce_schema},
    table,
    temporal::{add_time_parts, parse_datetime},
};

/// Runs every transform stage over already-loaded tables and returns the
/// joined table sorted by timestamp (nulls last).
pub fn build_analytics(
    orders: &Table,
    users: &Table,
    config: &PipelineConfig,
) -> PipelineResult<Table> {
    let users = harmonize_keys(users, &config.join_key)?;

    let orders = enforce_schema(orders)?;
    let orders = parse_datetime(&orders, &config.timestamp_column, config.utc)?;
    let orders = add_time_parts(&orders, &config.timestamp_column)?;

    let amount = orders.column(&config.amount_column)?;
    let bounds = iqr_bounds(amount, config.outlier_k)?;
    info!(
        "Outlier bounds for '{}' (k={}): [{}, {}]",
        config.amount_column, config.outlier_k, bounds.lo, bounds.hi
    );
    let orders =
        orders.with_column(winsorize(amount, bounds).renamed(config.winsor_column()))?;
    let orders = add_outlier_flag(&orders, &config.amount_column, config.outlier_k)?;

    let options = JoinOptions {
        validate: config.validate,
        suffixes: config.suffixes.clone(),
    };
    let analytics = safe_left_join(&orders, &users, config.join_key.as_slice(), &options)?;
    analytics.sort_by(&config.timestamp_column, SortOrder::default())
}

/// Stringifies the join key columns of the lookup table so they compare with
/// the schema-enforced order keys.
fn harmonize_keys(users: &Table, keys: &[String]) -> PipelineResult<Table> {
    let coerced = keys
        .iter()
        .map(|key| Ok(coerce_column(users.column(key)?, &ColumnType::String)))
        .collect::<PipelineResult<Vec<_>>>()?;
    users.with_columns(coerced)
}

pub fn render_preview(analytics: &Table, config: &PipelineConfig) -> String {
    let projected = analytics.select_existing(config.preview_columns.as_slice());
    debug!("Preview columns: {:?}", projected.column_names());
    format!(
        "\n=== Analytics table (sorted) - first {} rows ===\n{}",
        config.preview_rows,
        table::render_frame(&projected, config.preview_rows)
    )
}

pub fn execute(args: &BuildArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(k) = args.k {
        config.outlier_k = k;
    }
    if let Some(validate) = args.validate {
        config.validate = validate;
    }
    if let Some(rows) = args.preview_rows {
        config.preview_rows = rows;
    }
    config.validate()?;

    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let orders = io_utils::read_csv_table(&args.orders, args.delimiter, encoding)
        .with_context(|| format!("Loading orders from {:?}", args.orders))?;
    let users = io_utils::read_csv_table(&args.users, args.delimiter, encoding)
        .with_context(|| format!("Loading users from {:?}", args.users))?;
    info!(
        "Loaded {} order row(s) and {} user row(s)",
        orders.height(),
        users.height()
    );

    let analytics = build_analytics(&orders, &users, &config)
        .context("Building analytics table")?;

    if !args.no_preview {
        println!("{}", render_preview(&analytics, &config));
    }

    parquet_sink::write_parquet(&analytics, &args.output)
        .with_context(|| format!("Writing analytics table to {:?}", args.output))?;
    println!("\nWrote: {}", args.output.display());
    Ok(())
}
