use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocOffset {
    pub start: usize,
    pub end: usize,
}

impl DocOffset {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// A prediction offset as it arrives from upstream.
///
/// Model output carries integer character offsets. Manually injected
/// predictions may carry anything else (floats, negatives, strings); those
/// are kept verbatim so they survive a round trip but never take part in
/// geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Index(usize),
    Other(Value),
}

impl Offset {
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Other(_) => None,
        }
    }
}

impl From<usize> for Offset {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub page: u32,
}

impl BoundingBox {
    #[must_use]
    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }

    #[must_use]
    pub fn vertical_overlap(&self, top: f64, bottom: f64) -> f64 {
        (self.bottom.min(bottom) - self.top.max(top)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPosition {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    #[serde(alias = "doc_offset")]
    pub doc_offsets: DocOffset,
    #[serde(alias = "bbox")]
    pub position: TokenPosition,
    #[serde(default, alias = "page")]
    pub page_num: u32,
}

/// Fields the crate does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Prediction {
    #[must_use]
    pub fn new(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start: Some(Offset::Index(start)),
            end: Some(Offset::Index(end)),
            confidence: None,
            row_number: None,
            error: None,
            bounding_box: None,
            extra: Map::new(),
        }
    }

    /// Offsets usable for token lookup, or `None` for sentinel values and
    /// empty or inverted ranges.
    #[must_use]
    pub fn span(&self) -> Option<DocOffset> {
        let start = self.start.as_ref()?.index()?;
        let end = self.end.as_ref()?.index()?;
        (end > start).then_some(DocOffset { start, end })
    }
}

/// One annotated table cell. `rows` and `columns` list every index the cell
/// covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub rows: Vec<usize>,
    pub columns: Vec<usize>,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "doc_offset", skip_serializing_if = "Option::is_none")]
    pub doc_offsets: Option<DocOffset>,
}

impl Cell {
    #[must_use]
    pub fn new(rows: Vec<usize>, columns: Vec<usize>, text: impl Into<String>) -> Self {
        Self {
            rows,
            columns,
            text: text.into(),
            doc_offsets: None,
        }
    }

    #[must_use]
    pub fn with_doc_offsets(mut self, start: usize, end: usize) -> Self {
        self.doc_offsets = Some(DocOffset::new(start, end));
        self
    }

    #[must_use]
    pub fn row_span(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn col_span(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.row_span() > 1 || self.col_span() > 1
    }
}
