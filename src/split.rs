//! Splitting multi-line predictions into one prediction per line.

use regex::{Matches, Regex};

use crate::error::StructureError;
use crate::model::{Offset, Prediction};

pub const DEFAULT_SEPARATOR_PATTERN: &str = r"\s*\n\s*";

#[derive(Debug, Clone)]
pub struct PredictionSplitter {
    pattern: Regex,
}

impl PredictionSplitter {
    pub fn new(pattern: &str) -> Result<Self, StructureError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    #[must_use]
    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }

    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Lazily yields one prediction per text segment between separators.
    ///
    /// Each call starts a fresh walk, so the same prediction can be split
    /// any number of times.
    pub fn split<'s, 'p>(
        &'s self,
        prediction: &'p Prediction,
    ) -> Result<SplitPredictions<'s, 'p>, StructureError> {
        let start = prediction
            .start
            .as_ref()
            .and_then(Offset::index)
            .ok_or_else(|| StructureError::MissingField {
                field: "start",
                context: format!("prediction '{}'", prediction.label),
            })?;

        Ok(SplitPredictions {
            prediction,
            separators: self.pattern.find_iter(&prediction.text),
            segment_start: 0,
            offset: start,
            finished: false,
        })
    }
}

impl Default for PredictionSplitter {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_SEPARATOR_PATTERN).expect("default separator pattern is valid"),
        }
    }
}

#[derive(Debug)]
pub struct SplitPredictions<'s, 'p> {
    prediction: &'p Prediction,
    separators: Matches<'s, 'p>,
    segment_start: usize,
    offset: usize,
    finished: bool,
}

impl SplitPredictions<'_, '_> {
    fn emit(&self, segment: &str) -> Prediction {
        let mut piece = self.prediction.clone();
        piece.text = segment.to_string();
        piece.start = Some(Offset::Index(self.offset));
        piece.end = Some(Offset::Index(self.offset + segment.chars().count()));
        piece
    }
}

impl Iterator for SplitPredictions<'_, '_> {
    type Item = Prediction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let text = self.prediction.text.as_str();
        let Some(separator) = self.separators.next() else {
            self.finished = true;
            return Some(self.emit(&text[self.segment_start..]));
        };

        let segment = &text[self.segment_start..separator.start()];
        let piece = self.emit(segment);
        self.offset += segment.chars().count() + separator.as_str().chars().count();
        self.segment_start = separator.end();
        Some(piece)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::PredictionSplitter;
    use crate::error::StructureError;
    use crate::model::{Offset, Prediction};

    fn offsets(pieces: &[Prediction]) -> Vec<(String, Option<usize>, Option<usize>)> {
        pieces
            .iter()
            .map(|piece| {
                (
                    piece.text.clone(),
                    piece.start.as_ref().and_then(Offset::index),
                    piece.end.as_ref().and_then(Offset::index),
                )
            })
            .collect()
    }

    #[test]
    fn splits_on_newlines_with_surrounding_whitespace() {
        let prediction = Prediction::new("address", "12 Main St \n  Springfield\nIL", 100, 128);
        let pieces = PredictionSplitter::default()
            .split(&prediction)
            .expect("prediction has a start")
            .collect::<Vec<_>>();

        assert_eq!(
            offsets(&pieces),
            vec![
                ("12 Main St".to_string(), Some(100), Some(110)),
                ("Springfield".to_string(), Some(114), Some(125)),
                ("IL".to_string(), Some(126), Some(128)),
            ]
        );
    }

    #[test]
    fn rejoining_with_separators_reproduces_text() {
        let text = "a, b,,c";
        let prediction = Prediction::new("list", text, 5, 12);
        let splitter = PredictionSplitter::new(r",\s*").expect("pattern compiles");

        let pieces = splitter.split(&prediction).expect("prediction has a start").collect::<Vec<_>>();
        let separators = splitter
            .pattern()
            .find_iter(text)
            .map(|found| found.as_str())
            .collect::<Vec<_>>();

        let mut rebuilt = String::new();
        for (index, piece) in pieces.iter().enumerate() {
            rebuilt.push_str(&piece.text);
            if let Some(separator) = separators.get(index) {
                rebuilt.push_str(separator);
            }
        }

        assert_eq!(rebuilt, text);
        assert_eq!(pieces.len(), separators.len() + 1);
        assert_eq!(pieces[2].text, "");
        assert_eq!(pieces.first().and_then(|p| p.start.clone()), Some(Offset::Index(5)));
        assert_eq!(pieces.last().and_then(|p| p.end.clone()), Some(Offset::Index(12)));
    }

    #[test]
    fn single_line_prediction_yields_itself() {
        let prediction = Prediction::new("total", "42.00", 3, 8);
        let pieces = PredictionSplitter::default()
            .split(&prediction)
            .expect("prediction has a start")
            .collect::<Vec<_>>();
        assert_eq!(pieces, vec![prediction]);
    }

    #[test]
    fn keeps_other_fields_and_counts_characters() {
        let mut prediction = Prediction::new("name", "Zoë\nMüller", 0, 10);
        prediction.row_number = Some(4);
        prediction.extra.insert("model".to_string(), json!("v2"));

        let pieces = PredictionSplitter::default()
            .split(&prediction)
            .expect("prediction has a start")
            .collect::<Vec<_>>();

        assert_eq!(
            offsets(&pieces),
            vec![
                ("Zoë".to_string(), Some(0), Some(3)),
                ("Müller".to_string(), Some(4), Some(10)),
            ]
        );
        assert!(pieces.iter().all(|piece| piece.row_number == Some(4)));
        assert!(pieces.iter().all(|piece| piece.extra["model"] == json!("v2")));
    }

    #[test]
    fn split_is_restartable() {
        let prediction = Prediction::new("x", "a\nb", 0, 3);
        let splitter = PredictionSplitter::default();
        let first = splitter.split(&prediction).expect("start").collect::<Vec<_>>();
        let second = splitter.split(&prediction).expect("start").collect::<Vec<_>>();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn prediction_without_start_is_rejected() {
        let mut prediction = Prediction::new("x", "a\nb", 0, 3);
        prediction.start = None;
        let err = PredictionSplitter::default()
            .split(&prediction)
            .expect_err("missing start should fail");
        assert!(matches!(err, StructureError::MissingField { field: "start", .. }));
    }
}
