use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::error::StructureError;
use crate::table::CellTable;

impl CellTable {
    /// Every grid position yields one `<td>`, so the markup has exactly
    /// `rows` `<tr>` elements of `columns` cells each. Anchors of merged
    /// cells carry `rowspan`/`colspan`; positions they cover render as empty
    /// placeholders.
    pub fn to_markup(&self) -> Result<String, StructureError> {
        let grid = self.grid()?;
        let mut html = String::from("<table>\n");

        for row in &grid.cells {
            html.push_str("  <tr>");
            for position in row {
                let Some(cell) = position else {
                    html.push_str("<td></td>");
                    continue;
                };

                html.push_str("<td");
                if cell.row_span > 1 {
                    let _ = write!(html, " rowspan=\"{}\"", cell.row_span);
                }
                if cell.col_span > 1 {
                    let _ = write!(html, " colspan=\"{}\"", cell.col_span);
                }
                html.push('>');
                html.push_str(&escape(cell.text.as_str()));
                html.push_str("</td>");
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</table>");
        Ok(html)
    }
}
