//! IQR outlier bounds, winsorizing, and outlier flags.
//!
//! Both [`winsorize`] and [`add_outlier_flag`] read the column through
//! [`numeric_values`], so bounds computed for one are identical to the bounds
//! the other computes for the same column and `k`.

use log::debug;

use crate::{
    data::coerce_f64,
    error::{PipelineError, PipelineResult},
    frame::{Column, Table},
};

pub const DEFAULT_K: f64 = 1.5;
pub const OUTLIER_FLAG_COLUMN: &str = "is_outlier";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub fn clip(&self, value: f64) -> f64 {
        value.max(self.lo).min(self.hi)
    }

    /// True when `value` lies strictly outside `[lo, hi]`.
    pub fn excludes(&self, value: f64) -> bool {
        value < self.lo || value > self.hi
    }
}

/// Numeric view of a column; unparseable cells are `None`.
pub fn numeric_values(column: &Column) -> Vec<Option<f64>> {
    column
        .values()
        .iter()
        .map(|cell| cell.as_ref().and_then(coerce_f64))
        .collect()
}

/// Quantile with linear interpolation between closest ranks. `sorted` must be
/// non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// `(Q1 - k*IQR, Q3 + k*IQR)` over the column's numeric cells. Cells that do
/// not coerce to a number are dropped; a column with none left is an error.
pub fn iqr_bounds(column: &Column, k: f64) -> PipelineResult<Bounds> {
    let mut observed = numeric_values(column)
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    if observed.is_empty() {
        return Err(PipelineError::InsufficientData {
            column: column.name().to_string(),
        });
    }
    observed.sort_by(f64::total_cmp);
    let q1 = quantile(&observed, 0.25);
    let q3 = quantile(&observed, 0.75);
    let iqr = q3 - q1;
    let bounds = Bounds {
        lo: q1 - k * iqr,
        hi: q3 + k * iqr,
    };
    debug!(
        "IQR bounds for '{}' (k={k}, n={}): q1={q1}, q3={q3}, lo={}, hi={}",
        column.name(),
        observed.len(),
        bounds.lo,
        bounds.hi
    );
    Ok(bounds)
}

/// Clips every numeric cell into `[lo, hi]`; nulls stay null. The result keeps
/// the source column's name.
pub fn winsorize(column: &Column, bounds: Bounds) -> Column {
    Column::from_floats(
        column.name(),
        numeric_values(column)
            .into_iter()
            .map(|value| value.map(|v| bounds.clip(v))),
    )
}

/// Recomputes bounds for `column` and adds `is_outlier`. Null cells are never
/// flagged.
pub fn add_outlier_flag(table: &Table, column: &str, k: f64) -> PipelineResult<Table> {
    let source = table.column(column)?;
    let bounds = iqr_bounds(source, k)?;
    let flags = numeric_values(source)
        .into_iter()
        .map(|value| value.is_some_and(|v| bounds.excludes(v)))
        .collect::<Vec<_>>();
    let flagged = flags.iter().filter(|f| **f).count();
    debug!("Flagged {flagged} outlier(s) in '{column}'");
    table.with_column(Column::from_bools(OUTLIER_FLAG_COLUMN, flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn amounts(values: &[Option<&str>]) -> Column {
        Column::from_strings("amount", values.iter().copied())
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [10.0, 11.0, 12.0, 13.0, 1000.0];
        assert_eq!(quantile(&sorted, 0.25), 11.0);
        assert_eq!(quantile(&sorted, 0.75), 13.0);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25), 1.75);
    }

    #[test]
    fn iqr_bounds_ignores_non_numeric_cells() {
        let column = amounts(&[Some("10"), Some("oops"), None, Some("12"), Some("11")]);
        let bounds = iqr_bounds(&column, 1.0).unwrap();
        // q1 = 10.5, q3 = 11.5
        assert_eq!(bounds, Bounds { lo: 9.5, hi: 12.5 });
    }

    #[test]
    fn iqr_bounds_rejects_empty_columns() {
        let column = amounts(&[None, Some("n/a")]);
        assert_eq!(
            iqr_bounds(&column, DEFAULT_K).unwrap_err(),
            PipelineError::InsufficientData {
                column: "amount".into()
            }
        );
    }

    #[test]
    fn single_value_produces_degenerate_bounds() {
        let column = amounts(&[Some("100")]);
        let bounds = iqr_bounds(&column, DEFAULT_K).unwrap();
        assert_eq!(bounds, Bounds { lo: 100.0, hi: 100.0 });
        assert!(!bounds.excludes(100.0));
    }

    #[test]
    fn winsorize_keeps_nulls() {
        let column = amounts(&[Some("5"), None, Some("x")]);
        let clipped = winsorize(&column, Bounds { lo: 6.0, hi: 7.0 });
        assert_eq!(clipped.get(0), Some(&Value::Float(6.0)));
        assert_eq!(clipped.null_count(), 2);
        assert_eq!(clipped.name(), "amount");
    }
}
