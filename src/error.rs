use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    CsvEncoding(#[from] std::string::FromUtf8Error),

    #[error("spreadsheet archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid separator pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("no OCR token overlaps prediction '{label}' at offsets {start}..{end}")]
    NoMatch {
        label: String,
        start: usize,
        end: usize,
    },

    #[error("cannot merge bounding boxes of zero tokens")]
    EmptyInput,

    #[error(
        "cell '{cell_id}' spans {row_span} row(s) and {col_span} column(s); use the markup or spreadsheet view"
    )]
    UnsupportedSpan {
        cell_id: String,
        row_span: usize,
        col_span: usize,
    },

    #[error("malformed cell '{cell_id}': {reason}")]
    MalformedCell { cell_id: String, reason: String },

    #[error("missing field '{field}' on {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
