#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    UnmatchedPrediction,
    OffsetlessPrediction,
    DuplicateLabelInRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
    pub label: Option<String>,
    pub row_number: Option<u32>,
    pub prediction_index: Option<usize>,
}

impl Warning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            label: None,
            row_number: None,
            prediction_index: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_row_number(mut self, row_number: u32) -> Self {
        self.row_number = Some(row_number);
        self
    }

    #[must_use]
    pub fn with_prediction_index(mut self, index: usize) -> Self {
        self.prediction_index = Some(index);
        self
    }
}
