use std::str::FromStr;

use crate::error::StructureError;

#[derive(Debug, Clone, PartialEq)]
pub struct RowClusterOptions {
    /// Fraction of the shorter of (prediction height, row band height) that
    /// must overlap vertically for a prediction to join the current row.
    pub min_vertical_overlap: f64,
}

impl RowClusterOptions {
    pub fn validate(&self) -> Result<(), StructureError> {
        if !(self.min_vertical_overlap > 0.0 && self.min_vertical_overlap <= 1.0) {
            return Err(StructureError::InvalidOption(format!(
                "min_vertical_overlap must be in (0, 1], got {}",
                self.min_vertical_overlap
            )));
        }
        Ok(())
    }
}

impl Default for RowClusterOptions {
    fn default() -> Self {
        Self {
            min_vertical_overlap: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSelection {
    labels: Vec<String>,
}

impl LabelSelection {
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn into_labels(self) -> Vec<String> {
        self.labels
    }
}

impl FromStr for LabelSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut labels: Vec<String> = Vec::new();
        for label in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !labels.iter().any(|existing| existing == label) {
                labels.push(label.to_string());
            }
        }

        if labels.is_empty() {
            return Err("label selection cannot be empty".to_string());
        }

        Ok(Self { labels })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
    Xlsx,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "html" | "markup" => Ok(Self::Html),
            "xlsx" | "spreadsheet" => Ok(Self::Xlsx),
            other => Err(format!(
                "unknown export format '{other}', expected csv, html or xlsx"
            )),
        }
    }
}
