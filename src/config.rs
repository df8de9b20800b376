//! Pipeline settings loaded from an optional YAML file.
//!
//! Every field has a default, so an absent file and an empty file are
//! equivalent. Command-line flags override the loaded values.

use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::{join::JoinValidation, outliers::DEFAULT_K};

pub const DEFAULT_PREVIEW_ROWS: usize = 20;

pub const DEFAULT_PREVIEW_COLUMNS: &[&str] = &[
    "order_id",
    "user_id",
    "created_at",
    "amount",
    "amount_winsor",
    "quantity",
    "is_outlier",
    "status",
    "country",
    "signup_date",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub timestamp_column: String,
    pub amount_column: String,
    pub join_key: Vec<String>,
    pub outlier_k: f64,
    pub validate: JoinValidation,
    pub suffixes: (String, String),
    pub utc: bool,
    pub preview_rows: usize,
    pub preview_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "created_at".to_string(),
            amount_column: "amount".to_string(),
            join_key: vec!["user_id".to_string()],
            outlier_k: DEFAULT_K,
            validate: JoinValidation::ManyToOne,
            suffixes: (String::new(), "_right".to_string()),
            utc: true,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            preview_columns: DEFAULT_PREVIEW_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening YAML file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing pipeline config {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(raw)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.outlier_k.is_finite() && self.outlier_k >= 0.0,
            "outlier_k must be a non-negative number, got {}",
            self.outlier_k
        );
        ensure!(!self.join_key.is_empty(), "join_key cannot be empty");
        ensure!(
            !self.timestamp_column.trim().is_empty(),
            "timestamp_column cannot be empty"
        );
        ensure!(
            !self.amount_column.trim().is_empty(),
            "amount_column cannot be empty"
        );
        Ok(())
    }

    pub fn winsor_column(&self) -> String {
        format!("{}_winsor", self.amount_column)
    }
}
