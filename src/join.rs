//! Left outer join with cardinality validation and a row-count guard.
//!
//! [`safe_left_join`] checks key uniqueness before joining according to the
//! requested [`JoinValidation`], then independently asserts that the output
//! has exactly as many rows as the left input.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
};

use anyhow::anyhow;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    data::Value,
    error::{PipelineError, PipelineResult},
    frame::{Column, Table},
};

/// Composite key of one row. A null cell is a key part like any other, so
/// null keys match each other and count as duplicates.
type RowKey = Vec<Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinValidation {
    OneToOne,
    OneToMany,
    #[default]
    ManyToOne,
    ManyToMany,
}

impl JoinValidation {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinValidation::OneToOne => "one_to_one",
            JoinValidation::OneToMany => "one_to_many",
            JoinValidation::ManyToOne => "many_to_one",
            JoinValidation::ManyToMany => "many_to_many",
        }
    }

    fn left_unique(&self) -> bool {
        matches!(self, JoinValidation::OneToOne | JoinValidation::OneToMany)
    }

    fn right_unique(&self) -> bool {
        matches!(self, JoinValidation::OneToOne | JoinValidation::ManyToOne)
    }
}

impl fmt::Display for JoinValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinValidation {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "one_to_one" | "1:1" => Ok(JoinValidation::OneToOne),
            "one_to_many" | "1:m" => Ok(JoinValidation::OneToMany),
            "many_to_one" | "m:1" => Ok(JoinValidation::ManyToOne),
            "many_to_many" | "m:m" => Ok(JoinValidation::ManyToMany),
            other => Err(anyhow!("Unknown join validation '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOptions {
    pub validate: JoinValidation,
    /// Suffixes appended to colliding non-key column names: (left, right).
    pub suffixes: (String, String),
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            validate: JoinValidation::ManyToOne,
            suffixes: (String::new(), "_right".to_string()),
        }
    }
}

/// Left outer join of `left` with `right` on the `on` key columns.
///
/// Unmatched left rows get nulls for every right column. Null key cells match
/// null key cells on the other side. Fails with
/// [`PipelineError::CardinalityViolation`] when a side that `options.validate`
/// declares unique repeats a key (nulls included), and with
/// [`PipelineError::RowCountMismatch`] if the output height differs from
/// `left.height()`.
pub fn safe_left_join<S: AsRef<str>>(
    left: &Table,
    right: &Table,
    on: &[S],
    options: &JoinOptions,
) -> PipelineResult<Table> {
    let keys = on.iter().map(|k| k.as_ref()).collect::<Vec<_>>();
    let left_keys = key_columns(left, &keys)?;
    let right_keys = key_columns(right, &keys)?;
    validate_key_types(&left_keys, &right_keys)?;

    let left_rows = row_keys(&left_keys, left.height());
    let right_rows = row_keys(&right_keys, right.height());
    if options.validate.left_unique() {
        ensure_unique(&left_rows, &keys, options.validate, "left")?;
    }
    if options.validate.right_unique() {
        ensure_unique(&right_rows, &keys, options.validate, "right")?;
    }

    let mut lookup: HashMap<&RowKey, Vec<usize>> = HashMap::new();
    for (idx, key) in right_rows.iter().enumerate() {
        lookup.entry(key).or_default().push(idx);
    }

    let mut left_take = Vec::with_capacity(left.height());
    let mut right_take: Vec<Option<usize>> = Vec::with_capacity(left.height());
    let mut unmatched = 0usize;
    for (idx, key) in left_rows.iter().enumerate() {
        match lookup.get(key) {
            Some(bucket) => {
                for right_idx in bucket {
                    left_take.push(idx);
                    right_take.push(Some(*right_idx));
                }
            }
            None => {
                unmatched += 1;
                left_take.push(idx);
                right_take.push(None);
            }
        }
    }

    let columns = build_output_columns(left, right, &keys, &options.suffixes, &left_take, &right_take)?;
    let joined = Table::new(columns)?;

    if joined.height() != left.height() {
        return Err(PipelineError::RowCountMismatch {
            expected: left.height(),
            actual: joined.height(),
        });
    }
    if unmatched > 0 {
        warn!("{unmatched} left row(s) had no match on [{}]", keys.join(", "));
    }
    info!(
        "Join complete: {} output row(s), {} matched row(s)",
        joined.height(),
        joined.height() - unmatched
    );
    Ok(joined)
}

fn key_columns<'a>(table: &'a Table, keys: &[&str]) -> PipelineResult<Vec<&'a Column>> {
    keys.iter().map(|name| table.column(name)).collect()
}

fn validate_key_types(left: &[&Column], right: &[&Column]) -> PipelineResult<()> {
    for (l, r) in left.iter().zip(right.iter()) {
        let compatible = l.datatype() == r.datatype()
            || (l.datatype().is_numeric() && r.datatype().is_numeric());
        if !compatible {
            return Err(PipelineError::KeyTypeMismatch {
                column: l.name().to_string(),
                left: l.datatype().clone(),
                right: r.datatype().clone(),
            });
        }
    }
    Ok(())
}

fn row_keys(columns: &[&Column], height: usize) -> Vec<RowKey> {
    (0..height)
        .map(|row| {
            columns
                .iter()
                .map(|column| column.get(row).map(Value::as_display))
                .collect()
        })
        .collect()
}

fn describe_key(key: &RowKey) -> String {
    key.iter()
        .map(|part| part.as_deref().unwrap_or("<NA>"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn ensure_unique(
    rows: &[RowKey],
    keys: &[&str],
    validation: JoinValidation,
    side: &'static str,
) -> PipelineResult<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for key in rows {
        if !seen.insert(key) {
            debug!("Duplicate {side} join key {key:?}");
            return Err(PipelineError::CardinalityViolation {
                validation: validation.to_string(),
                side,
                columns: keys.join(", "),
                key: describe_key(key),
            });
        }
    }
    Ok(())
}

fn build_output_columns(
    left: &Table,
    right: &Table,
    keys: &[&str],
    suffixes: &(String, String),
    left_take: &[usize],
    right_take: &[Option<usize>],
) -> PipelineResult<Vec<Column>> {
    let right_extra = right
        .columns()
        .iter()
        .filter(|c| !keys.contains(&c.name()))
        .collect::<Vec<_>>();
    let right_names = right_extra.iter().map(|c| c.name()).collect::<HashSet<_>>();
    let left_names = left
        .columns()
        .iter()
        .filter(|c| !keys.contains(&c.name()))
        .map(|c| c.name())
        .collect::<HashSet<_>>();

    let mut columns = Vec::with_capacity(left.width() + right_extra.len());
    for column in left.columns() {
        let name = if right_names.contains(column.name()) && !keys.contains(&column.name()) {
            format!("{}{}", column.name(), suffixes.0)
        } else {
            column.name().to_string()
        };
        let values = left_take
            .iter()
            .map(|idx| column.values()[*idx].clone())
            .collect();
        columns.push(Column::new(name, column.datatype().clone(), values));
    }
    for column in right_extra {
        let name = if left_names.contains(column.name()) {
            format!("{}{}", column.name(), suffixes.1)
        } else {
            column.name().to_string()
        };
        let values = right_take
            .iter()
            .map(|idx| idx.and_then(|i| column.values()[i].clone()))
            .collect();
        columns.push(Column::new(name, column.datatype().clone(), values));
    }

    let mut seen = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !seen.insert(column.name()) {
            return Err(PipelineError::DuplicateColumn {
                column: column.name().to_string(),
            });
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new(vec![
            Column::from_strings("user_id", [Some("5"), Some("7")]),
            Column::from_strings("country", [Some("US"), Some("DE")]),
        ])
        .unwrap()
    }

    fn orders() -> Table {
        Table::new(vec![
            Column::from_strings("order_id", [Some("1"), Some("2"), Some("3")]),
            Column::from_strings("user_id", [Some("5"), Some("9"), Some("5")]),
        ])
        .unwrap()
    }

    #[test]
    fn unmatched_left_rows_get_null_right_columns() {
        let joined = safe_left_join(&orders(), &users(), &["user_id"], &JoinOptions::default())
            .unwrap();
        assert_eq!(joined.height(), 3);
        let country = joined.column("country").unwrap();
        assert_eq!(country.get(0), Some(&Value::String("US".into())));
        assert_eq!(country.get(1), None);
        assert_eq!(country.get(2), Some(&Value::String("US".into())));
    }

    #[test]
    fn one_to_one_rejects_duplicate_left_keys() {
        let options = JoinOptions {
            validate: JoinValidation::OneToOne,
            ..JoinOptions::default()
        };
        let err = safe_left_join(&orders(), &users(), &["user_id"], &options).unwrap_err();
        match err {
            PipelineError::CardinalityViolation { side, key, .. } => {
                assert_eq!(side, "left");
                assert_eq!(key, "5");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn validation_parses_from_pandas_spellings() {
        assert_eq!(
            JoinValidation::from_str("m:1").unwrap(),
            JoinValidation::ManyToOne
        );
        assert_eq!(
            JoinValidation::from_str("one-to-many").unwrap(),
            JoinValidation::OneToMany
        );
        assert!(JoinValidation::from_str("sideways").is_err());
    }

    #[test]
    fn null_keys_match_null_keys() {
        let left = Table::new(vec![
            Column::from_strings("order_id", [Some("1"), Some("2")]),
            Column::from_strings("user_id", [None, Some("5")]),
        ])
        .unwrap();
        let right = Table::new(vec![
            Column::from_strings("user_id", [None, Some("5")]),
            Column::from_strings("country", [Some("XX"), Some("US")]),
        ])
        .unwrap();
        let joined = safe_left_join(&left, &right, &["user_id"], &JoinOptions::default()).unwrap();
        let country = joined.column("country").unwrap();
        assert_eq!(country.get(0), Some(&Value::String("XX".into())));
        assert_eq!(country.get(1), Some(&Value::String("US".into())));
    }

    #[test]
    fn repeated_null_right_keys_violate_many_to_one() {
        let left = Table::new(vec![Column::from_strings("user_id", [Some("5")])]).unwrap();
        let right = Table::new(vec![
            Column::from_strings("user_id", [None::<&str>, None]),
            Column::from_strings("country", [Some("XX"), Some("YY")]),
        ])
        .unwrap();
        let err = safe_left_join(&left, &right, &["user_id"], &JoinOptions::default()).unwrap_err();
        match err {
            PipelineError::CardinalityViolation { side, key, .. } => {
                assert_eq!(side, "right");
                assert_eq!(key, "<NA>");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn composite_key_parts_do_not_bleed_into_each_other() {
        let left = Table::new(vec![
            Column::from_strings("a", [Some("x\u{1f}y")]),
            Column::from_strings("b", [Some("z")]),
        ])
        .unwrap();
        let right = Table::new(vec![
            Column::from_strings("a", [Some("x"), Some("x\u{1f}y")]),
            Column::from_strings("b", [Some("y\u{1f}z"), Some("z")]),
            Column::from_strings("tag", [Some("wrong"), Some("right")]),
        ])
        .unwrap();
        let joined = safe_left_join(&left, &right, &["a", "b"], &JoinOptions::default()).unwrap();
        assert_eq!(
            joined.column("tag").unwrap().get(0),
            Some(&Value::String("right".into()))
        );
    }

    #[test]
    fn key_type_mismatch_is_reported() {
        let numeric_users = Table::new(vec![Column::new(
            "user_id",
            crate::schema::ColumnType::Integer,
            vec![Some(Value::Integer(5))],
        )])
        .unwrap();
        let err = safe_left_join(&orders(), &numeric_users, &["user_id"], &JoinOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::KeyTypeMismatch { .. }));
    }
}
