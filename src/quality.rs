//! Data-quality helpers: missingness reporting, missing-value flags, and
//! latest-wins deduplication.

use std::collections::HashSet;

use log::info;
use serde::Serialize;

use crate::{
    data::Value,
    error::PipelineResult,
    frame::{Column, SortOrder, Table},
    temporal::parse_datetime,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingnessEntry {
    pub column: String,
    pub n_missing: usize,
    pub p_missing: f64,
}

/// Null count and fraction per column, highest fraction first. Ties keep
/// column order. An empty table reports a fraction of zero.
pub fn missingness_report(table: &Table) -> Vec<MissingnessEntry> {
    let height = table.height();
    let mut entries = table
        .columns()
        .iter()
        .map(|column| {
            let n_missing = column.null_count();
            let p_missing = if height == 0 {
                0.0
            } else {
                n_missing as f64 / height as f64
            };
            MissingnessEntry {
                column: column.name().to_string(),
                n_missing,
                p_missing,
            }
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.p_missing.total_cmp(&a.p_missing));
    entries
}

pub fn render_missingness_rows(entries: &[MissingnessEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            vec![
                entry.column.clone(),
                entry.n_missing.to_string(),
                format!("{:.4}", entry.p_missing),
            ]
        })
        .collect()
}

/// Adds a boolean `<col>_is_missing` column for each requested column.
pub fn add_missing_flags<S: AsRef<str>>(table: &Table, columns: &[S]) -> PipelineResult<Table> {
    let flags = columns
        .iter()
        .map(|name| {
            let column = table.column(name.as_ref())?;
            Ok(Column::from_bools(
                format!("{}_is_missing", column.name()),
                column.values().iter().map(Option::is_none),
            ))
        })
        .collect::<PipelineResult<Vec<_>>>()?;
    table.with_columns(flags)
}

/// Parses `timestamp_column` as UTC, sorts ascending (nulls last, stable) and
/// keeps only the last row for each combination of `key_columns`. Null key
/// cells compare equal to each other.
pub fn dedupe_keep_latest<S: AsRef<str>>(
    table: &Table,
    key_columns: &[S],
    timestamp_column: &str,
) -> PipelineResult<Table> {
    let parsed = parse_datetime(table, timestamp_column, true)?;
    let sorted = parsed.sort_by(timestamp_column, SortOrder::default())?;
    let keys = key_columns
        .iter()
        .map(|name| sorted.column(name.as_ref()))
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(sorted.height());
    let mut keep = Vec::new();
    for row in (0..sorted.height()).rev() {
        let key = keys
            .iter()
            .map(|c| c.get(row).map(Value::as_display))
            .collect::<Vec<_>>();
        if seen.insert(key) {
            keep.push(row);
        }
    }
    keep.reverse();

    let deduped = sorted.take_rows(&keep);
    info!(
        "Deduplicated {} row(s) down to {} on [{}]",
        table.height(),
        deduped.height(),
        key_columns
            .iter()
            .map(|k| k.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(deduped)
}
