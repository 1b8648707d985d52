mod association;
mod csv_out;
mod error;
mod geometry;
mod line_items;
mod markup;
mod model;
mod options;
mod span_index;
mod split;
mod spreadsheet;
mod table;
mod warning;

pub use association::{Axis, CellLabelAssociation};
pub use csv_out::{TabularOutput, write_csv, write_csv_to_string};
pub use error::StructureError;
pub use line_items::{LineItems, NO_MATCH_ERROR, RowReport};
pub use model::{BoundingBox, Cell, DocOffset, Offset, Prediction, Token, TokenPosition};
pub use options::{ExportFormat, LabelSelection, RowClusterOptions};
pub use span_index::SpanIndex;
pub use split::{DEFAULT_SEPARATOR_PATTERN, PredictionSplitter, SplitPredictions};
pub use table::{CellTable, GridCell, MAX_GRID_CELLS, TableGrid};
pub use warning::{Warning, WarningCode};

pub fn cluster_line_items<I, S>(
    predictions: Vec<Prediction>,
    tokens: &[Token],
    line_item_labels: I,
    options: RowClusterOptions,
    raise_for_no_match: bool,
) -> Result<(LineItems, RowReport), StructureError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut items = LineItems::new(predictions, line_item_labels).with_options(options)?;
    items.get_bounding_boxes(tokens, raise_for_no_match)?;
    let report = items.assign_row_number();
    Ok((items, report))
}

/// Splits every prediction with the given splitter, keeping predictions
/// that have no start offset as they are.
pub fn split_predictions(
    predictions: &[Prediction],
    splitter: &PredictionSplitter,
) -> Result<Vec<Prediction>, StructureError> {
    let mut pieces = Vec::with_capacity(predictions.len());
    for (index, prediction) in predictions.iter().enumerate() {
        match splitter.split(prediction) {
            Ok(split) => pieces.extend(split),
            Err(StructureError::MissingField { field, .. }) => {
                tracing::debug!(
                    label = %prediction.label,
                    index,
                    field,
                    "prediction kept whole; it has no offsets to split on"
                );
                pieces.push(prediction.clone());
            }
            Err(error) => return Err(error),
        }
    }
    Ok(pieces)
}
