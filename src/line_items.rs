//! Row clustering for line-item predictions.
//!
//! [`LineItems`] takes ownership of a document's prediction list, resolves a
//! bounding box for every prediction whose label is on the line-item
//! allow-list and tags those predictions with the 1-based visual row they sit
//! on. Predictions with other labels pass through untouched. The list is
//! decorated in place and never grows or shrinks.

use std::collections::BTreeMap;

use crate::error::StructureError;
use crate::model::{BoundingBox, Prediction, Token};
use crate::options::RowClusterOptions;
use crate::span_index::SpanIndex;
use crate::warning::{Warning, WarningCode};

/// Annotation left on a line-item prediction whose offsets hit no token.
pub const NO_MATCH_ERROR: &str = "No matching token found";

#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub row_count: usize,
    pub assigned: usize,
    pub unmatched: usize,
    pub ignored: usize,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct LineItems {
    predictions: Vec<Prediction>,
    line_item_labels: Vec<String>,
    options: RowClusterOptions,
    warnings: Vec<Warning>,
}

impl LineItems {
    pub fn new<I, S>(predictions: Vec<Prediction>, line_item_labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = Vec::new();
        for label in line_item_labels.into_iter().map(Into::into) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        Self {
            predictions,
            line_item_labels: labels,
            options: RowClusterOptions::default(),
            warnings: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: RowClusterOptions) -> Result<Self, StructureError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    #[must_use]
    pub fn line_item_labels(&self) -> &[String] {
        &self.line_item_labels
    }

    #[must_use]
    pub fn is_line_item(&self, prediction: &Prediction) -> bool {
        is_line_item_label(&self.line_item_labels, &prediction.label)
    }

    /// Resolves a bounding box for every line-item prediction.
    ///
    /// With `raise_for_no_match` the first prediction that overlaps no token
    /// aborts the call and nothing is modified. Without it the prediction is
    /// annotated with [`NO_MATCH_ERROR`] and left out of row assignment.
    pub fn get_bounding_boxes(
        &mut self,
        tokens: &[Token],
        raise_for_no_match: bool,
    ) -> Result<(), StructureError> {
        let index = SpanIndex::new(tokens);
        let mut warnings = Vec::new();
        let mut resolved = Vec::new();

        for (position, prediction) in self.predictions.iter().enumerate() {
            if !is_line_item_label(&self.line_item_labels, &prediction.label) {
                continue;
            }

            let Some(span) = prediction.span() else {
                warnings.push(
                    Warning::new(
                        WarningCode::OffsetlessPrediction,
                        "prediction has no usable character offsets; skipped for geometry",
                    )
                    .with_label(&prediction.label)
                    .with_prediction_index(position),
                );
                continue;
            };

            let matched = index.find_overlaps(span.start, span.end);
            if matched.is_empty() {
                if raise_for_no_match {
                    return Err(StructureError::NoMatch {
                        label: prediction.label.clone(),
                        start: span.start,
                        end: span.end,
                    });
                }
                resolved.push((position, None));
                continue;
            }

            resolved.push((position, Some(BoundingBox::enclosing(&matched)?)));
        }

        for (position, bounding_box) in resolved {
            let prediction = &mut self.predictions[position];
            prediction.bounding_box = bounding_box;
            prediction.row_number = None;
            if bounding_box.is_some() {
                prediction.error = None;
                continue;
            }

            tracing::warn!(
                label = %prediction.label,
                index = position,
                "no OCR token overlaps line-item prediction"
            );
            prediction.error = Some(NO_MATCH_ERROR.to_string());
            warnings.push(
                Warning::new(WarningCode::UnmatchedPrediction, NO_MATCH_ERROR)
                    .with_label(&prediction.label)
                    .with_prediction_index(position),
            );
        }

        tracing::debug!(
            tokens = index.len(),
            warnings = warnings.len(),
            "resolved line-item bounding boxes"
        );
        self.warnings = warnings;
        Ok(())
    }

    pub fn assign_row_number(&mut self) -> RowReport {
        let mut placed = Vec::new();
        for (position, prediction) in self.predictions.iter_mut().enumerate() {
            if !is_line_item_label(&self.line_item_labels, &prediction.label) {
                continue;
            }
            prediction.row_number = None;
            if let Some(bounding_box) = prediction.bounding_box {
                placed.push((position, bounding_box));
            }
        }

        placed.sort_by(|(_, a), (_, b)| {
            a.page
                .cmp(&b.page)
                .then(a.top.total_cmp(&b.top))
                .then(a.left.total_cmp(&b.left))
        });

        // The band is the box that opened the row; it never widens.
        let mut row_count = 0_u32;
        let mut band: Option<(u32, f64, f64)> = None;
        for &(position, bounding_box) in &placed {
            let joins = band.is_some_and(|(page, top, bottom)| {
                page == bounding_box.page
                    && joins_band(&bounding_box, top, bottom, self.options.min_vertical_overlap)
            });
            if !joins {
                row_count += 1;
                band = Some((bounding_box.page, bounding_box.top, bounding_box.bottom));
            }
            self.predictions[position].row_number = Some(row_count);
        }

        let mut warnings = self.warnings.clone();
        warnings.extend(self.duplicate_label_warnings());

        let unmatched = self
            .line_item_predictions()
            .filter(|prediction| prediction.error.as_deref() == Some(NO_MATCH_ERROR))
            .count();
        let ignored = self.ignored_predictions().count();

        tracing::debug!(
            rows = row_count,
            assigned = placed.len(),
            unmatched,
            ignored,
            "assigned line-item row numbers"
        );

        RowReport {
            row_count: row_count as usize,
            assigned: placed.len(),
            unmatched,
            ignored,
            warnings,
        }
    }

    #[must_use]
    pub fn updated_predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    #[must_use]
    pub fn into_predictions(self) -> Vec<Prediction> {
        self.predictions
    }

    pub fn line_item_predictions(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions
            .iter()
            .filter(|prediction| is_line_item_label(&self.line_item_labels, &prediction.label))
    }

    pub fn ignored_predictions(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions
            .iter()
            .filter(|prediction| !is_line_item_label(&self.line_item_labels, &prediction.label))
    }

    #[must_use]
    pub fn grouped_rows(&self) -> BTreeMap<u32, Vec<&Prediction>> {
        let mut rows: BTreeMap<u32, Vec<&Prediction>> = BTreeMap::new();
        for prediction in self.line_item_predictions() {
            if let Some(row_number) = prediction.row_number {
                rows.entry(row_number).or_default().push(prediction);
            }
        }
        rows
    }

    fn duplicate_label_warnings(&self) -> Vec<Warning> {
        let mut counts: BTreeMap<(u32, &str), usize> = BTreeMap::new();
        for prediction in self.line_item_predictions() {
            if let Some(row_number) = prediction.row_number {
                *counts
                    .entry((row_number, prediction.label.as_str()))
                    .or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((row_number, label), count)| {
                Warning::new(
                    WarningCode::DuplicateLabelInRow,
                    format!("label occurs {count} times in the same row"),
                )
                .with_label(label)
                .with_row_number(row_number)
            })
            .collect()
    }
}

fn is_line_item_label(labels: &[String], label: &str) -> bool {
    labels.iter().any(|candidate| candidate == label)
}

fn joins_band(bounding_box: &BoundingBox, top: f64, bottom: f64, min_overlap: f64) -> bool {
    let shorter = bounding_box.height().min((bottom - top).max(0.0));
    if shorter <= 0.0 {
        return bounding_box.top <= bottom;
    }

    let overlap = bounding_box.vertical_overlap(top, bottom);
    overlap > 0.0 && overlap >= min_overlap * shorter
}
