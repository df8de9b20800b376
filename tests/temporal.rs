mod common;

use chrono::NaiveDate;
use common::text_table;
use order_analytics::data::Value;
use order_analytics::schema::ColumnType;
use order_analytics::temporal::{TIME_PART_SUFFIXES, add_time_parts, parse_datetime};
use proptest::prelude::*;

#[test]
fn time_parts_are_derived_from_parsed_timestamps() {
    let table = text_table(&["created_at"], &[&["2024-01-01T13:45:00Z"], &["oops"]]);
    let parsed = parse_datetime(&table, "created_at", true).unwrap();
    let parts = add_time_parts(&parsed, "created_at").unwrap();

    let names = parts.column_names();
    assert_eq!(names[0], "created_at");
    for (suffix, name) in TIME_PART_SUFFIXES.iter().zip(&names[1..]) {
        assert_eq!(*name, format!("created_at_{suffix}"));
    }

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(
        parts.column("created_at_date").unwrap().get(0),
        Some(&Value::Date(date))
    );
    assert_eq!(
        parts.column("created_at_date").unwrap().datatype(),
        &ColumnType::Date
    );
    assert_eq!(
        parts.column("created_at_year").unwrap().get(0),
        Some(&Value::Integer(2024))
    );
    assert_eq!(
        parts.column("created_at_month").unwrap().get(0),
        Some(&Value::Integer(1))
    );
    // 2024-01-01 is a Monday.
    assert_eq!(
        parts.column("created_at_dow").unwrap().get(0),
        Some(&Value::Integer(0))
    );
    assert_eq!(
        parts.column("created_at_hour").unwrap().get(0),
        Some(&Value::Integer(13))
    );

    for suffix in TIME_PART_SUFFIXES {
        let column = parts.column(&format!("created_at_{suffix}")).unwrap();
        assert_eq!(column.get(1), None, "{suffix} should be null");
    }
}

#[test]
fn parse_datetime_requires_the_column() {
    let table = text_table(&["ts"], &[&["2024-01-01"]]);
    assert!(parse_datetime(&table, "created_at", true).is_err());
}

proptest! {
    #[test]
    fn utc_parts_stay_in_range(
        secs in 0i64..4_102_444_800,
        offset_minutes in -720i32..=840,
    ) {
        let offset = chrono::FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let instant = chrono::DateTime::from_timestamp(secs, 0).unwrap().with_timezone(&offset);
        let table = text_table(&["created_at"], &[&[instant.to_rfc3339().as_str()]]);
        let parsed = parse_datetime(&table, "created_at", true).unwrap();
        let parts = add_time_parts(&parsed, "created_at").unwrap();
        match parts.column("created_at_hour").unwrap().get(0) {
            Some(Value::Integer(hour)) => prop_assert!((0..=23).contains(hour)),
            other => prop_assert!(false, "unexpected hour {:?}", other),
        }
        match parts.column("created_at_dow").unwrap().get(0) {
            Some(Value::Integer(dow)) => prop_assert!((0..=6).contains(dow)),
            other => prop_assert!(false, "unexpected dow {:?}", other),
        }
    }
}
