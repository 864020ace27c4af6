use std::path::Path;

use crate::tally::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

fn clean_cell(s: &str) -> String {
    s.trim_start_matches('\u{feff}').trim().to_string()
}

/// Reads rows laid out as a marking grid: a header row with the candidate names,
/// then one row per ballot where a non-empty cell is a mark for the candidate
/// of its column.
///
/// Rows are numbered from 1, as in spreadsheets.
pub fn parse_grid(path: &str, rows: &[Vec<String>], cfs: &FileSource) -> TallyResult<SourceBallots> {
    let default_id = make_default_id(path);
    let first_col = cfs.first_vote_column_index(2)?;
    let first_row = cfs.first_vote_row_index(2)?;
    if first_row == 0 {
        whatever!(
            "{}: the grid layout needs a header row before the first ballot row",
            path
        );
    }

    let header: Vec<String> = rows
        .get(first_row - 1)
        .context(MissingHeaderSnafu { path })?
        .iter()
        .map(|s| clean_cell(s))
        .collect();
    let names: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(first_col)
        .filter(|(idx, name)| {
            if name.is_empty() {
                warn!(
                    "parse_grid: {}: column {} has no candidate name, ignoring it",
                    path,
                    idx + 1
                );
            }
            !name.is_empty()
        })
        .map(|(idx, name)| (idx, name.clone()))
        .collect();
    debug!("parse_grid: {}: candidate columns: {:?}", path, names);

    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let selections: Vec<String> = names
            .iter()
            .filter(|(col, _)| row.get(*col).map(|s| !clean_cell(s).is_empty()) == Some(true))
            .map(|(_, name)| name.clone())
            .collect();
        let id = row
            .first()
            .filter(|_| first_col > 0)
            .map(|s| clean_cell(s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_id(lineno));
        debug!("parse_grid: line {}: {}: {:?}", lineno, id, selections);
        ballots.push(ParsedBallot {
            id: Some(id),
            selections,
        });
    }
    Ok(SourceBallots {
        header: names.into_iter().map(|(_, name)| name).collect(),
        ballots,
    })
}

/// Reads rows where each row lists the names marked on one ballot.
pub fn parse_list(path: &str, rows: &[Vec<String>], cfs: &FileSource) -> TallyResult<SourceBallots> {
    let default_id = make_default_id(path);
    let first_col = cfs.first_vote_column_index(1)?;
    let first_row = cfs.first_vote_row_index(1)?;

    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let selections: Vec<String> = row
            .iter()
            .skip(first_col)
            .map(|s| clean_cell(s))
            .filter(|s| !s.is_empty())
            .collect();
        debug!("parse_list: line {}: {:?}", lineno, selections);
        ballots.push(ParsedBallot {
            id: Some(default_id(lineno)),
            selections,
        });
    }
    Ok(SourceBallots {
        header: Vec::new(),
        ballots,
    })
}
