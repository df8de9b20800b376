use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::join::JoinValidation;

#[derive(Debug, Parser)]
#[command(author, version, about = "Build a typed, joined analytics table from order and user extracts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write the analytics table as Parquet
    Build(BuildArgs),
    /// Report the count and fraction of missing values per column
    Missing(MissingArgs),
    /// Preview the first few rows of a CSV file in a formatted table
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Orders CSV extract
    #[arg(long)]
    pub orders: PathBuf,
    /// Users CSV extract
    #[arg(long)]
    pub users: PathBuf,
    /// Destination Parquet file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Optional YAML pipeline configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// IQR multiplier for outlier bounds (overrides the config file)
    #[arg(long)]
    pub k: Option<f64>,
    /// Join cardinality check: one_to_one, one_to_many, many_to_one, many_to_many
    /// (also 1:1, 1:m, m:1, m:m; overrides the config file)
    #[arg(long, value_parser = parse_validation)]
    pub validate: Option<JoinValidation>,
    /// Number of rows to show in the console preview (overrides the config file)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
    /// Skip the console preview
    #[arg(long = "no-preview")]
    pub no_preview: bool,
    /// CSV delimiter character for both inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct MissingArgs {
    /// Input CSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_validation(value: &str) -> Result<JoinValidation, String> {
    value.parse::<JoinValidation>().map_err(|err| err.to_string())
}
