//! Parquet output sink.
//!
//! Column types map onto Arrow as follows: string → Utf8, integer → Int64,
//! float → Float64, boolean → Boolean, date → Date32, timestamp →
//! Timestamp(µs, "UTC"). Every field is nullable.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::{
    data::Value,
    frame::{Column, Table},
    schema::ColumnType,
};

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
const TIMEZONE: &str = "UTC";

fn arrow_type(datatype: &ColumnType) -> DataType {
    match datatype {
        ColumnType::String => DataType::Utf8,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Date => DataType::Date32,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some(TIMEZONE.into())),
    }
}

fn arrow_array(column: &Column) -> ArrayRef {
    let cells = column.values().iter().map(|c| c.as_ref());
    match column.datatype() {
        ColumnType::String => Arc::new(StringArray::from(
            cells.map(|c| c.map(Value::as_display)).collect::<Vec<_>>(),
        )),
        ColumnType::Integer => Arc::new(Int64Array::from(
            cells
                .map(|c| match c {
                    Some(Value::Integer(i)) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Float => Arc::new(Float64Array::from(
            cells
                .map(|c| match c {
                    Some(Value::Float(f)) => Some(*f),
                    Some(Value::Integer(i)) => Some(*i as f64),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Boolean => Arc::new(BooleanArray::from(
            cells
                .map(|c| match c {
                    Some(Value::Boolean(b)) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Date => Arc::new(Date32Array::from(
            cells
                .map(|c| match c {
                    Some(Value::Date(d)) => Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Timestamp => Arc::new(
            TimestampMicrosecondArray::from(
                cells
                    .map(|c| match c {
                        Some(Value::Timestamp(ts)) => Some(ts.timestamp_micros()),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
            )
            .with_timezone(TIMEZONE),
        ),
    }
}

pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let fields = table
        .columns()
        .iter()
        .map(|c| Field::new(c.name(), arrow_type(c.datatype()), true))
        .collect::<Vec<_>>();
    let arrays = table.columns().iter().map(arrow_array).collect::<Vec<_>>();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("Building Arrow record batch")
}

/// Writes `table` as a single-row-group Parquet file, creating parent
/// directories as needed.
pub fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating output directory {parent:?}"))?;
    }
    let batch = to_record_batch(table)?;
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("Opening Parquet writer")?;
    writer.write(&batch).context("Writing Parquet row group")?;
    writer.close().context("Finalizing Parquet file")?;
    info!(
        "Wrote {} row(s) x {} column(s) to {:?}",
        table.height(),
        table.width(),
        path
    );
    Ok(())
}
