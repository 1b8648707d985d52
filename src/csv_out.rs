use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use crate::error::StructureError;
use crate::line_items::LineItems;
use crate::table::CellTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularOutput {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularOutput {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn write_to<W: Write>(&self, sink: W, delimiter: u8) -> Result<W, StructureError> {
        let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(sink);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|error| StructureError::Io(error.into_error()))
    }
}

impl LineItems {
    /// One record per row number, one column per line-item label. Values of
    /// a label repeated within a row are joined with a space.
    #[must_use]
    pub fn row_table(&self) -> TabularOutput {
        let labels = self.line_item_labels();
        let mut headers = vec!["row_number".to_string()];
        headers.extend(labels.iter().cloned());

        let rows = self
            .grouped_rows()
            .into_iter()
            .map(|(row_number, predictions)| {
                let mut record = Vec::with_capacity(labels.len() + 1);
                record.push(row_number.to_string());
                record.extend(labels.iter().map(|label| {
                    predictions
                        .iter()
                        .filter(|prediction| &prediction.label == label)
                        .map(|prediction| prediction.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                }));
                record
            })
            .collect();

        TabularOutput { headers, rows }
    }
}

impl CellTable {
    pub fn to_tabular(&self) -> Result<TabularOutput, StructureError> {
        let rows = self.to_dense_table()?;
        let (_, columns) = self.shape();
        let headers = (1..=columns).map(|index| format!("col_{index}")).collect();
        Ok(TabularOutput { headers, rows })
    }
}

pub fn write_csv(path: &Path, output: &TabularOutput, delimiter: u8) -> Result<(), StructureError> {
    let file = BufWriter::new(File::create(path)?);
    output.write_to(file, delimiter)?.flush()?;
    Ok(())
}

pub fn write_csv_to_string(output: &TabularOutput, delimiter: u8) -> Result<String, StructureError> {
    let bytes = output.write_to(Vec::new(), delimiter)?;
    Ok(String::from_utf8(bytes)?)
}
