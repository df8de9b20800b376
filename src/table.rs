//! Elastic ASCII table rendering for console previews.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    data::Value,
    frame::Table,
    schema::ColumnType,
};

const NULL_MARKER: &str = "<NA>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

impl Align {
    fn for_type(datatype: &ColumnType) -> Self {
        if datatype.is_numeric() {
            Align::Right
        } else {
            Align::Left
        }
    }
}

/// Renders left-aligned columns separated by two spaces, with a dashed rule
/// under the header.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let aligns = vec![Align::Left; headers.len()];
    render_aligned(headers, rows, &aligns)
}

pub fn render_aligned(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let widths = column_widths(headers, rows);
    let mut output = String::new();

    let _ = writeln!(output, "{}", format_row(headers, &widths, aligns));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, aligns));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

/// Renders the first `limit` rows of a table. Numeric columns are
/// right-aligned and nulls show as `<NA>`.
pub fn render_frame(table: &Table, limit: usize) -> String {
    let head = table.head(limit);
    let headers = head
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let aligns = head
        .columns()
        .iter()
        .map(|c| Align::for_type(c.datatype()))
        .collect::<Vec<_>>();
    let rows = (0..head.height())
        .map(|row| {
            head.columns()
                .iter()
                .map(|c| {
                    c.get(row)
                        .map(Value::as_display)
                        .unwrap_or_else(|| NULL_MARKER.to_string())
                })
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    render_aligned(&headers, &rows, &aligns)
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    widths.into_iter().map(|w| w.max(3)).collect()
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let sanitized = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
            match aligns.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{sanitized}{padding}"),
                Align::Right => format!("{padding}{sanitized}"),
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape, e.g. \x1b[31m
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
