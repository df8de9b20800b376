//! In-memory columnar table shared by every pipeline stage.
//!
//! A [`Table`] is an immutable snapshot: each operation borrows its input and
//! returns a new table, so a stage can never observe another stage's edits.

use std::cmp::Ordering;

use crate::{
    data::Value,
    error::{PipelineError, PipelineResult},
    schema::ColumnType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    datatype: ColumnType,
    values: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: ColumnType, values: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            datatype,
            values,
        }
    }

    /// Builds a text column, treating `None` as a null cell.
    pub fn from_strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| v.map(|s| Value::String(s.into())))
            .collect();
        Self::new(name, ColumnType::String, values)
    }

    pub fn from_floats<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let values = values.into_iter().map(|v| v.map(Value::Float)).collect();
        Self::new(name, ColumnType::Float, values)
    }

    pub fn from_bools<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let values = values
            .into_iter()
            .map(|v| Some(Value::Boolean(v)))
            .collect();
        Self::new(name, ColumnType::Boolean, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> &ColumnType {
        &self.datatype
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(|v| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            datatype: self.datatype.clone(),
            values: indices.iter().map(|idx| self.values[*idx].clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub ascending: bool,
    pub nulls_last: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder {
            ascending: true,
            nulls_last: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> PipelineResult<Self> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != height) {
            return Err(PipelineError::LengthMismatch {
                column: bad.name.clone(),
                expected: height,
                actual: bad.len(),
            });
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(PipelineError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { columns, height })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> PipelineResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::missing_column(name))
    }

    /// Returns a copy with `column` replacing the same-named column in place,
    /// or appended when no column of that name exists.
    pub fn with_column(&self, column: Column) -> PipelineResult<Table> {
        if !self.columns.is_empty() && column.len() != self.height {
            return Err(PipelineError::LengthMismatch {
                expected: self.height,
                actual: column.len(),
                column: column.name,
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter().position(|c| c.name == column.name) {
            Some(idx) => columns[idx] = column,
            None => columns.push(column),
        }
        let height = columns.first().map(Column::len).unwrap_or(0);
        Ok(Table { columns, height })
    }

    pub fn with_columns(&self, columns: impl IntoIterator<Item = Column>) -> PipelineResult<Table> {
        columns
            .into_iter()
            .try_fold(self.clone(), |table, column| table.with_column(column))
    }

    /// Projects only those requested columns that exist, skipping the rest.
    pub fn select_existing<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let columns = names
            .iter()
            .filter_map(|name| self.column(name.as_ref()).ok().cloned())
            .collect::<Vec<_>>();
        let height = if columns.is_empty() { 0 } else { self.height };
        Table { columns, height }
    }

    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            height: indices.len(),
        }
    }

    pub fn head(&self, rows: usize) -> Table {
        let indices = (0..self.height.min(rows)).collect::<Vec<_>>();
        self.take_rows(&indices)
    }

    /// Stable sort on a single column.
    pub fn sort_by(&self, column: &str, order: SortOrder) -> PipelineResult<Table> {
        let key = self.column(column)?;
        let mut indices = (0..self.height).collect::<Vec<_>>();
        indices.sort_by(|a, b| compare_cells(key.get(*a), key.get(*b), order));
        Ok(self.take_rows(&indices))
    }
}

pub(crate) fn compare_cells(left: Option<&Value>, right: Option<&Value>, order: SortOrder) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) if order.nulls_last => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) if order.nulls_last => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) if order.ascending => l.cmp(r),
        (Some(l), Some(r)) => r.cmp(l),
    }
}
