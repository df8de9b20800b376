//! Timestamp parsing and calendar-part derivation.

use chrono::{Datelike, Timelike, Utc};
use log::{debug, warn};

use crate::{
    data::{Value, coerce_timestamp},
    error::{PipelineError, PipelineResult},
    frame::{Column, Table},
    schema::ColumnType,
};

/// Suffixes of the columns [`add_time_parts`] derives, in output order.
pub const TIME_PART_SUFFIXES: &[&str] = &["date", "year", "month", "dow", "hour"];

/// Parses `column` into timestamps. Unparseable cells become null. With
/// `utc` every instant is shifted to the UTC offset; otherwise the parsed
/// offset is kept and offset-less inputs are read as UTC.
pub fn parse_datetime(table: &Table, column: &str, utc: bool) -> PipelineResult<Table> {
    let source = table.column(column)?;
    let mut failures = 0usize;
    let values = source
        .values()
        .iter()
        .map(|cell| {
            let cell = cell.as_ref()?;
            let parsed = coerce_timestamp(cell);
            if parsed.is_none() {
                failures += 1;
            }
            let parsed = parsed?;
            let parsed = if utc {
                parsed.with_timezone(&Utc).fixed_offset()
            } else {
                parsed
            };
            Some(Value::Timestamp(parsed))
        })
        .collect::<Vec<_>>();
    if failures > 0 {
        warn!("{failures} value(s) in '{column}' could not be parsed as timestamps and were set to null");
    }
    debug!("Parsed '{column}' as timestamps (utc={utc})");
    table.with_column(Column::new(column, ColumnType::Timestamp, values))
}

/// Adds `<col>_date`, `<col>_year`, `<col>_month`, `<col>_dow` (Monday = 0)
/// and `<col>_hour`. The source column must already be timestamp-typed.
pub fn add_time_parts(table: &Table, column: &str) -> PipelineResult<Table> {
    let source = table.column(column)?;
    if source.datatype() != &ColumnType::Timestamp {
        return Err(PipelineError::TypeMismatch {
            column: column.to_string(),
            expected: ColumnType::Timestamp,
            actual: source.datatype().clone(),
        });
    }

    let mut date = Vec::with_capacity(source.len());
    let mut year = Vec::with_capacity(source.len());
    let mut month = Vec::with_capacity(source.len());
    let mut dow = Vec::with_capacity(source.len());
    let mut hour = Vec::with_capacity(source.len());
    for cell in source.values() {
        match cell {
            Some(Value::Timestamp(ts)) => {
                date.push(Some(Value::Date(ts.date_naive())));
                year.push(Some(Value::Integer(i64::from(ts.year()))));
                month.push(Some(Value::Integer(i64::from(ts.month()))));
                dow.push(Some(Value::Integer(i64::from(
                    ts.weekday().num_days_from_monday(),
                ))));
                hour.push(Some(Value::Integer(i64::from(ts.hour()))));
            }
            _ => {
                date.push(None);
                year.push(None);
                month.push(None);
                dow.push(None);
                hour.push(None);
            }
        }
    }

    table.with_columns([
        Column::new(format!("{column}_date"), ColumnType::Date, date),
        Column::new(format!("{column}_year"), ColumnType::Integer, year),
        Column::new(format!("{column}_month"), ColumnType::Integer, month),
        Column::new(format!("{column}_dow"), ColumnType::Integer, dow),
        Column::new(format!("{column}_hour"), ColumnType::Integer, hour),
    ])
}
