#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use order_analytics::frame::{Column, Table};
use tempfile::{TempDir, tempdir};

pub const ORDERS_CSV: &str = "\
order_id,user_id,amount,quantity,created_at,status
1,5,100,2,2024-01-03T10:00:00Z,paid
2,7,12.5,1,2024-01-01 08:30:00,paid
3,5,not-a-number,x,garbage,refunded
4,9,11,3,2024-01-02T23:59:00+02:00,paid
5,7,13,,2024-01-04,shipped
6,5,1000,1,2024-01-05T00:00:00Z,paid
";

pub const USERS_CSV: &str = "\
user_id,country,signup_date
5,US,2023-12-01
7,SA,2023-11-15
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a text-typed table from column names and row-major cells; empty
/// strings become nulls.
pub fn text_table(headers: &[&str], rows: &[&[&str]]) -> Table {
    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            Column::from_strings(
                *name,
                rows.iter()
                    .map(|row| Some(row[idx]).filter(|cell| !cell.is_empty())),
            )
        })
        .collect();
    Table::new(columns).expect("rectangular table")
}
