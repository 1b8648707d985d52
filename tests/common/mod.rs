#![allow(dead_code)]

use docstruct::{Cell, CellTable, DocOffset, Prediction, Token, TokenPosition};

pub const LINE_ITEM_LABELS: [&str; 3] = ["work_order_number", "line_date", "work_order_tonnage"];
pub const IGNORED_LABEL: &str = "should be ignored";

pub struct Invoice {
    pub text: String,
    pub tokens: Vec<Token>,
    pub predictions: Vec<Prediction>,
}

/// Three printed rows of `row N wo  row N date  row N tonnage`, one word per
/// token. Fields on the same line are nudged up and down a few points so the
/// row bands are not perfectly flat.
pub fn three_row_invoice() -> Invoice {
    invoice_with_row_pitch(30.0)
}

/// Same invoice with 14pt words printed 12pt apart, so each row's band
/// overlaps its neighbours.
pub fn tightly_spaced_invoice() -> Invoice {
    invoice_with_row_pitch(12.0)
}

fn invoice_with_row_pitch(pitch: f64) -> Invoice {
    let fields = [
        ("work_order_number", "wo"),
        ("line_date", "date"),
        ("work_order_tonnage", "tonnage"),
    ];
    let jitter = [0.0, 3.0, -2.0];

    let mut text = String::new();
    let mut tokens = Vec::new();
    let mut predictions = Vec::new();

    for row in 1..=3_u32 {
        if row > 1 {
            text.push('\n');
        }
        let top = 100.0 + f64::from(row - 1) * pitch;
        let mut left = 20.0;

        for (field_index, (label, suffix)) in fields.iter().enumerate() {
            if field_index > 0 {
                text.push(' ');
            }
            let value = format!("row {row} {suffix}");
            let start = text.chars().count();

            for (word_index, word) in value.split(' ').enumerate() {
                if word_index > 0 {
                    text.push(' ');
                }
                let word_start = text.chars().count();
                text.push_str(word);
                let width = 8.0 * word.len() as f64;
                let word_top = top + jitter[field_index % jitter.len()];
                tokens.push(Token {
                    text: word.to_string(),
                    doc_offsets: DocOffset::new(word_start, word_start + word.len()),
                    position: TokenPosition {
                        top: word_top,
                        left,
                        right: left + width,
                        bottom: word_top + 14.0,
                    },
                    page_num: 0,
                });
                left += width + 6.0;
            }

            predictions.push(Prediction::new(*label, value, start, text.chars().count()));
        }
    }

    let ignored_start = text.chars().count() + 1;
    predictions.push(Prediction::new(
        IGNORED_LABEL,
        "not on the page",
        ignored_start + 500,
        ignored_start + 515,
    ));

    // Model output is not in reading order.
    predictions.rotate_left(4);

    Invoice {
        text,
        tokens,
        predictions,
    }
}

/// Row number a fixture prediction should land on, read from its text.
pub fn expected_row(prediction: &Prediction) -> Option<u32> {
    let mut words = prediction.text.split(' ');
    match (words.next(), words.next()) {
        (Some("row"), Some(number)) => number.parse().ok(),
        _ => None,
    }
}

/// Item | Qty table where "Bolts" spans the two data rows.
pub fn merged_cell_table() -> CellTable {
    [
        ("header-item", Cell::new(vec![0], vec![0], "Item")),
        ("header-qty", Cell::new(vec![0], vec![1], "Qty")),
        ("bolts", Cell::new(vec![1, 2], vec![0], "Bolts")),
        ("qty-1", Cell::new(vec![1], vec![1], "4")),
        ("qty-2", Cell::new(vec![2], vec![1], "6")),
    ]
    .into_iter()
    .map(|(id, cell)| (id.to_string(), cell))
    .collect()
}
