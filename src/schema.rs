//! Logical column types and schema enforcement for order extracts.
//!
//! [`enforce_schema`] coerces the four typed order columns. Identifier
//! columns are stringified, numeric columns are parsed leniently: a cell
//! that cannot be represented becomes null rather than failing the run.
//! Only a missing column is fatal.

use std::fmt;

use crate::{
    data::{Value, coerce_f64, coerce_i64, coerce_timestamp},
    error::PipelineResult,
    frame::{Column, Table},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared types of the order columns [`enforce_schema`] coerces.
pub const ORDER_SCHEMA: &[(&str, ColumnType)] = &[
    ("order_id", ColumnType::String),
    ("user_id", ColumnType::String),
    ("amount", ColumnType::Float),
    ("quantity", ColumnType::Integer),
];

/// Converts one column to `target`, nulling cells that cannot be represented.
pub fn coerce_column(column: &Column, target: &ColumnType) -> Column {
    let values = column
        .values()
        .iter()
        .map(|cell| cell.as_ref().and_then(|value| coerce_value(value, target)))
        .collect();
    Column::new(column.name(), target.clone(), values)
}

fn coerce_value(value: &Value, target: &ColumnType) -> Option<Value> {
    match target {
        ColumnType::String => Some(match value {
            Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.as_display()),
        }),
        ColumnType::Integer => coerce_i64(value).map(Value::Integer),
        ColumnType::Float => coerce_f64(value).map(Value::Float),
        ColumnType::Boolean => match value {
            Value::Boolean(b) => Some(Value::Boolean(*b)),
            Value::Integer(i) => Some(Value::Boolean(*i != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Some(Value::Boolean(true)),
                "false" | "f" | "no" | "n" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            _ => None,
        },
        ColumnType::Date => coerce_timestamp(value).map(|ts| Value::Date(ts.date_naive())),
        ColumnType::Timestamp => coerce_timestamp(value).map(Value::Timestamp),
    }
}

/// Coerces `order_id`/`user_id` to text, `amount` to float and `quantity` to
/// integer. Fails if any of the four columns is absent.
pub fn enforce_schema(table: &Table) -> PipelineResult<Table> {
    let coerced = ORDER_SCHEMA
        .iter()
        .map(|(name, datatype)| Ok(coerce_column(table.column(name)?, datatype)))
        .collect::<PipelineResult<Vec<_>>>()?;
    table.with_columns(coerced)
}
