use std::{borrow::Cow, collections::HashMap, sync::OnceLock};

use regex::Regex;

use crate::{
    data::Value,
    frame::Column,
    schema::ColumnType,
};

fn whitespace_run() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Trims, lowercases, and collapses internal whitespace runs to one space,
/// borrowing the input when it is already normalized. Lowercasing is
/// [`str::to_lowercase`], not full case folding: `"Straße"` stays `"straße"`.
pub fn normalize_str(input: &str) -> Cow<'_, str> {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();
    let folded: Cow<'_, str> = if lowered == trimmed {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(lowered)
    };
    let needs_collapse = folded.contains("  ")
        || folded.chars().any(|c| c.is_whitespace() && c != ' ');
    if !needs_collapse {
        return folded;
    }
    Cow::Owned(whitespace_run().replace_all(&folded, " ").into_owned())
}

/// Applies [`normalize_str`] to every cell, stringifying non-text values.
/// Nulls stay null.
pub fn normalize_text(column: &Column) -> Column {
    let values = column
        .values()
        .iter()
        .map(|cell| {
            cell.as_ref().map(|value| {
                let text = match value {
                    Value::String(s) => Cow::Borrowed(s.as_str()),
                    other => Cow::Owned(other.as_display()),
                };
                Value::String(normalize_str(&text).into_owned())
            })
        })
        .collect();
    Column::new(column.name(), ColumnType::String, values)
}

/// Normalizes the column, then replaces values found in `mapping`. Values
/// without an entry pass through normalized but otherwise unchanged.
pub fn apply_mapping(column: &Column, mapping: &HashMap<String, String>) -> Column {
    let normalized = normalize_text(column);
    let values = normalized
        .values()
        .iter()
        .map(|cell| match cell {
            Some(Value::String(s)) => Some(Value::String(
                mapping.get(s).cloned().unwrap_or_else(|| s.clone()),
            )),
            other => other.clone(),
        })
        .collect();
    Column::new(column.name(), ColumnType::String, values)
}
