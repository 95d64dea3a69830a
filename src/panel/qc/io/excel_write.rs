use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::panel::qc::error::Result;
use crate::panel::qc::table::{SheetCell, SheetTable};

/// Writes the provided tables to the given path, one worksheet each.
pub fn write_workbook(path: &Path, tables: &[SheetTable]) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = col_idx as u16;
                match cell {
                    SheetCell::Blank => {}
                    SheetCell::Number(value) => {
                        worksheet.write_number(row_num, col_num, *value)?;
                    }
                    SheetCell::Text(value) => {
                        worksheet.write_string(row_num, col_num, value)?;
                    }
                }
            }
        }

        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);

        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = if table.rows.is_empty() {
            1
        } else {
            table.rows.len() as u32
        };
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
