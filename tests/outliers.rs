use order_analytics::data::Value;
use order_analytics::frame::{Column, Table};
use order_analytics::outliers::{
    Bounds, DEFAULT_K, OUTLIER_FLAG_COLUMN, add_outlier_flag, iqr_bounds, winsorize,
};
use proptest::prelude::*;

fn amounts(values: &[&str]) -> Column {
    Column::from_strings("amount", values.iter().map(|v| Some(*v)))
}

#[test]
fn extreme_amount_is_flagged_and_clipped_to_hi() {
    let column = amounts(&["10", "12", "11", "13", "1000"]);
    let bounds = iqr_bounds(&column, DEFAULT_K).unwrap();
    assert_eq!(bounds, Bounds { lo: 8.0, hi: 16.0 });

    let clipped = winsorize(&column, bounds);
    assert_eq!(clipped.get(4), Some(&Value::Float(bounds.hi)));
    assert_eq!(clipped.get(0), Some(&Value::Float(10.0)));

    let table = Table::new(vec![column]).unwrap();
    let flagged = add_outlier_flag(&table, "amount", DEFAULT_K).unwrap();
    let flags = flagged.column(OUTLIER_FLAG_COLUMN).unwrap();
    let expected = [false, false, false, false, true]
        .map(|b| Some(Value::Boolean(b)))
        .to_vec();
    assert_eq!(flags.values(), expected.as_slice());
}

#[test]
fn iqr_bounds_is_idempotent() {
    let column = amounts(&["3.5", "9", "-2", "40", "7", "7"]);
    assert_eq!(
        iqr_bounds(&column, 2.0).unwrap(),
        iqr_bounds(&column, 2.0).unwrap()
    );
}

#[test]
fn null_amounts_are_not_flagged() {
    let table = Table::new(vec![Column::from_strings(
        "amount",
        [Some("1"), None, Some("bad"), Some("2")],
    )])
    .unwrap();
    let flagged = add_outlier_flag(&table, "amount", 0.0).unwrap();
    let flags = flagged.column(OUTLIER_FLAG_COLUMN).unwrap();
    assert_eq!(flags.get(1), Some(&Value::Boolean(false)));
    assert_eq!(flags.get(2), Some(&Value::Boolean(false)));
}

#[test]
fn flag_requires_the_column() {
    let table = Table::new(vec![amounts(&["1"])]).unwrap();
    assert!(add_outlier_flag(&table, "price", DEFAULT_K).is_err());
}

proptest! {
    #[test]
    fn winsorized_values_stay_within_bounds(
        values in proptest::collection::vec(proptest::option::of(-1.0e6f64..1.0e6), 1..60),
        k in 0.0f64..4.0,
    ) {
        prop_assume!(values.iter().any(Option::is_some));
        let column = Column::from_floats("amount", values.clone());
        let bounds = iqr_bounds(&column, k).unwrap();
        let clipped = winsorize(&column, bounds);
        for (original, cell) in values.iter().zip(clipped.values()) {
            match (original, cell) {
                (None, None) => {}
                (Some(_), Some(Value::Float(v))) => {
                    prop_assert!(*v >= bounds.lo && *v <= bounds.hi);
                }
                other => prop_assert!(false, "unexpected pair {:?}", other),
            }
        }
    }

    #[test]
    fn flags_agree_with_the_same_bounds(
        values in proptest::collection::vec(proptest::option::of(-1.0e3f64..1.0e3), 1..60),
        k in 0.0f64..3.0,
    ) {
        prop_assume!(values.iter().any(Option::is_some));
        let column = Column::from_floats("amount", values.clone());
        let bounds = iqr_bounds(&column, k).unwrap();
        let table = Table::new(vec![column]).unwrap();
        let flagged = add_outlier_flag(&table, "amount", k).unwrap();
        let flags = flagged.column(OUTLIER_FLAG_COLUMN).unwrap();
        for (original, flag) in values.iter().zip(flags.values()) {
            let expected = original.is_some_and(|v| v < bounds.lo || v > bounds.hi);
            prop_assert_eq!(flag, &Some(Value::Boolean(expected)));
        }
    }
}
