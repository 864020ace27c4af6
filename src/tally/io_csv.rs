// Primitives for reading CSV files.

use crate::tally::{
    io_common::{parse_grid, parse_list},
    *,
};

pub fn read_csv_grid(path: &str, cfs: &FileSource) -> TallyResult<SourceBallots> {
    let rows = read_rows(path)?;
    parse_grid(path, &rows, cfs)
}

pub fn read_csv_list(path: &str, cfs: &FileSource) -> TallyResult<SourceBallots> {
    let rows = read_rows(path)?;
    parse_list(path, &rows, cfs)
}

fn read_rows(path: &str) -> TallyResult<Vec<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_rows: {:?} {:?}", lineno, line);
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    info!("read_rows: {}: {} rows", path, rows.len());
    Ok(rows)
}
