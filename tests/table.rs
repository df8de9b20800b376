use order_analytics::data::Value;
use order_analytics::frame::{Column, Table};
use order_analytics::table::{render_frame, render_table};

#[test]
fn render_table_aligns_columns() {
    let headers = vec!["id".to_string(), "name".to_string()];
    let rows = vec![
        vec!["1".to_string(), "Alice".to_string()],
        vec!["2".to_string(), "Bob".to_string()],
    ];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines, vec!["id   name", "---  -----", "1    Alice", "2    Bob"]);
}

#[test]
fn render_table_normalizes_control_characters() {
    let headers = vec!["note".to_string()];
    let rows = vec![vec!["line1\nline2\tvalue".to_string()]];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "line1 line2 value");
}

#[test]
fn render_frame_right_aligns_numbers_and_marks_nulls() {
    let table = Table::new(vec![
        Column::from_strings("user", [Some("ann"), Some("bo")]),
        Column::from_floats("amount", [Some(5.5), None]),
    ])
    .unwrap();

    let rendered = render_frame(&table, 10);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines,
        vec!["user  amount", "----  ------", "ann      5.5", "bo      <NA>"]
    );
}

#[test]
fn render_frame_limits_rows() {
    let table = Table::new(vec![Column::new(
        "n",
        order_analytics::schema::ColumnType::Integer,
        (0..30).map(|i| Some(Value::Integer(i))).collect(),
    )])
    .unwrap();
    let rendered = render_frame(&table, 20);
    assert_eq!(rendered.lines().count(), 22);
}
