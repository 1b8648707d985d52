use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::StructureError;
use crate::table::{CellTable, TableGrid};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

impl CellTable {
    pub fn to_spreadsheet(&self, path: &Path) -> Result<(), StructureError> {
        let file = BufWriter::new(File::create(path)?);
        self.write_spreadsheet(file)?;
        Ok(())
    }

    pub fn write_spreadsheet<W: Write + Seek>(&self, writer: W) -> Result<W, StructureError> {
        let grid = self.grid()?;
        let options = SimpleFileOptions::default();
        let mut zip = ZipWriter::new(writer);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES.as_bytes())?;
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS.as_bytes())?;
        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(WORKBOOK.as_bytes())?;
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(WORKBOOK_RELS.as_bytes())?;
        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(worksheet_xml(&grid).as_bytes())?;

        tracing::debug!(
            rows = grid.rows,
            columns = grid.columns,
            "wrote spreadsheet"
        );
        Ok(zip.finish()?)
    }
}

fn worksheet_xml(grid: &TableGrid) -> String {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    let mut merges = Vec::new();

    for (row_index, row) in grid.cells.iter().enumerate() {
        if row.iter().all(Option::is_none) {
            continue;
        }

        sheet.push_str(&format!("<row r=\"{}\">", row_index + 1));
        for (column_index, position) in row.iter().enumerate() {
            let Some(cell) = position else {
                continue;
            };

            sheet.push_str(&format!(
                "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                cell_reference(row_index, column_index),
                escape(cell.text.as_str())
            ));

            if cell.row_span > 1 || cell.col_span > 1 {
                merges.push(format!(
                    "{}:{}",
                    cell_reference(row_index, column_index),
                    cell_reference(
                        row_index + cell.row_span - 1,
                        column_index + cell.col_span - 1
                    )
                ));
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData>");

    if !merges.is_empty() {
        sheet.push_str(&format!("<mergeCells count=\"{}\">", merges.len()));
        for range in &merges {
            sheet.push_str(&format!("<mergeCell ref=\"{range}\"/>"));
        }
        sheet.push_str("</mergeCells>");
    }

    sheet.push_str("</worksheet>");
    sheet
}

/// A1-style reference for a zero-based grid position.
fn cell_reference(row: usize, column: usize) -> String {
    format!("{}{}", column_letters(column), row + 1)
}

fn column_letters(column: usize) -> String {
    let mut remaining = column + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        letters.push(char::from(b'A' + (remaining % 26) as u8));
        remaining /= 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::{cell_reference, column_letters};
    use crate::model::Cell;
    use crate::table::CellTable;

    #[test]
    fn converts_zero_based_positions_to_a1_references() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(4, 2), "C5");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn writes_anchors_and_merge_ranges() {
        let cells: CellTable = [
            ("h", Cell::new(vec![0], vec![0, 1], "Header")),
            ("m", Cell::new(vec![1, 2], vec![0], "Bolts")),
            ("q", Cell::new(vec![1], vec![1], "4")),
        ]
        .into_iter()
        .map(|(id, cell)| (id.to_string(), cell))
        .collect();

        let cursor = cells
            .write_spreadsheet(Cursor::new(Vec::new()))
            .expect("spreadsheet should be written");

        let mut archive = ZipArchive::new(cursor).expect("output is a zip archive");
        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .expect("worksheet part exists")
            .read_to_string(&mut sheet)
            .expect("worksheet is UTF-8");

        assert!(sheet.contains("<c r=\"A1\" t=\"inlineStr\"><is><t xml:space=\"preserve\">Header</t>"));
        assert!(sheet.contains("<c r=\"A2\""));
        assert!(sheet.contains("<c r=\"B2\""));
        assert!(sheet.contains("<mergeCells count=\"2\"><mergeCell ref=\"A1:B1\"/><mergeCell ref=\"A2:A3\"/></mergeCells>"));
        assert!(!sheet.contains("<row r=\"3\">"));
    }
}
