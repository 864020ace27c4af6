use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName", default)]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    pub _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// Index of the first column holding votes, from 0.
    ///
    /// In the configuration, columns start at 1 or are Excel letters.
    pub fn first_vote_column_index(&self, default: usize) -> TallyResult<usize> {
        let x = read_js_int(&self._first_vote_column_index, default)?;
        Ok(x - 1)
    }

    /// Index of the first row holding a ballot, from 0.
    pub fn first_vote_row_index(&self, default: usize) -> TallyResult<usize> {
        let x = read_js_int(&self._first_vote_row_index, default)?;
        Ok(x - 1)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaSettings {
    #[serde(rename = "moreThanRequired")]
    pub more_than_required: Option<bool>,
    #[serde(rename = "lessThanRequired")]
    pub less_than_required: Option<bool>,
    pub blank: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyRules {
    #[serde(rename = "seatsToElect")]
    pub seats_to_elect: u32,
    #[serde(rename = "ballotCount")]
    pub ballot_count: Option<u32>,
    #[serde(rename = "invalidBallotCriteria")]
    pub invalid_ballot_criteria: Option<CriteriaSettings>,
    #[serde(rename = "calculationMode")]
    pub calculation_mode: Option<String>,
    #[serde(rename = "winnerRule")]
    pub winner_rule: Option<String>,
}

impl TallyRules {
    /// Every rule left out of the configuration is switched on.
    pub fn criteria(&self) -> InvalidBallotCriteria {
        let defaults = InvalidBallotCriteria::default();
        match &self.invalid_ballot_criteria {
            Some(c) => InvalidBallotCriteria {
                more_than_required: c.more_than_required.unwrap_or(defaults.more_than_required),
                less_than_required: c.less_than_required.unwrap_or(defaults.less_than_required),
                blank: c.blank.unwrap_or(defaults.blank),
            },
            None => defaults,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub candidates: Vec<TallyCandidate>,
    pub rules: TallyRules,
    pub ballots: Option<Vec<Vec<String>>>,
    #[serde(rename = "ballotFileSources")]
    pub ballot_file_sources: Option<Vec<FileSource>>,
}

pub fn read_config(path: &str) -> TallyResult<TallyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: TallyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn parse_calculation_mode(s: &str) -> TallyResult<CalculationMode> {
    match s {
        "totalBallots" => Ok(CalculationMode::TotalBallots),
        "validBallots" => Ok(CalculationMode::ValidBallots),
        x => whatever!("unknown calculation mode: {:?}", x),
    }
}

pub fn calculation_mode_name(mode: CalculationMode) -> &'static str {
    match mode {
        CalculationMode::TotalBallots => "totalBallots",
        CalculationMode::ValidBallots => "validBallots",
    }
}

pub fn parse_winner_rule(s: &str) -> TallyResult<WinnerRule> {
    match s {
        "topGroupMajority" => Ok(WinnerRule::TopGroupMajority),
        "simpleMajority" => Ok(WinnerRule::SimpleMajority),
        x => whatever!("unknown winner rule: {:?}", x),
    }
}

pub fn winner_rule_name(rule: WinnerRule) -> &'static str {
    match rule {
        WinnerRule::TopGroupMajority => "topGroupMajority",
        WinnerRule::SimpleMajority => "simpleMajority",
    }
}

// Numbers start at 1. Letters are Excel-style columns: A is 1, Z is 26, AA is 27.
fn read_js_int(x: &Option<JSValue>, default: usize) -> TallyResult<usize> {
    let res = match x {
        None | Some(JSValue::Null) => Some(default),
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add(c as usize - 'a' as usize + 1)
            })
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|x| *x >= 1)
        .context(ParsingJsonNumberSnafu { value: format!("{:?}", x) })
}
