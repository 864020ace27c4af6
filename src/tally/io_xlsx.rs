use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::tally::{io_common::parse_grid, *};

pub fn read_xlsx_grid(path: &str, cfs: &FileSource) -> TallyResult<SourceBallots> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match cfs.excel_worksheet_name.as_deref() {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    }
    .context(OpeningExcelSnafu { path })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = idx + 1;
        let mut cells: Vec<String> = Vec::new();
        for cell in row.iter() {
            cells.push(read_cell(cell, lineno, row)?);
        }
        rows.push(cells);
    }
    debug!("read_xlsx_grid: {}: {} rows", path, rows.len());
    parse_grid(path, &rows, cfs)
}

fn read_cell(cell: &DataType, lineno: usize, row: &[DataType]) -> TallyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(true) => Ok("X".to_string()),
        DataType::Bool(false) => Ok("".to_string()),
        _ => Err(TallyError::ExcelWrongCellType {
            lineno,
            content: format!("{:?} IN {:?}", cell, row),
        }),
    }
}
