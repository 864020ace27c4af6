use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use tally_engine::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot read a cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("No header row found in {path}"))]
    MissingHeader { path: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a column or row number, got {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid election setup"))]
    InvalidSetup { source: TallyErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// A ballot, as read from a file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub selections: Vec<String>,
}

/// The ballots of one source, and the candidate names found in its header (grid layouts only).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceBallots {
    pub header: Vec<String>,
    pub ballots: Vec<ParsedBallot>,
}

fn read_ballot_source(root_path: &Path, cfs: &FileSource) -> TallyResult<SourceBallots> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read ballot file {:?}", p2);
    match cfs.provider.as_str() {
        "csv_grid" => io_csv::read_csv_grid(&p2, cfs),
        "csv_list" => io_csv::read_csv_list(&p2, cfs),
        "xlsx_grid" => io_xlsx::read_xlsx_grid(&p2, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn cli_file_source(args: &Args, input: &str) -> FileSource {
    FileSource {
        provider: args
            .input_type
            .clone()
            .unwrap_or_else(|| "csv_grid".to_string()),
        file_path: input.to_string(),
        _first_vote_column_index: None,
        _first_vote_row_index: None,
        excel_worksheet_name: args.excel_worksheet_name.clone(),
    }
}

// Without a configuration file, the election is described by the command line only.
fn cli_config(args: &Args) -> TallyResult<TallyConfig> {
    let seats = match args.seats {
        Some(s) => s,
        None => whatever!("--seats is required when no configuration file is given"),
    };
    if args.input.is_none() {
        whatever!("either --config or --input must be given");
    }
    Ok(TallyConfig {
        output_settings: OutputSettings::default(),
        candidates: Vec::new(),
        rules: TallyRules {
            seats_to_elect: seats,
            ballot_count: None,
            invalid_ballot_criteria: None,
            calculation_mode: None,
            winner_rule: None,
        },
        ballots: None,
        ballot_file_sources: None,
    })
}

fn load_ballots(
    args: &Args,
    config: &TallyConfig,
    root_path: &Path,
) -> TallyResult<(Vec<ParsedBallot>, Vec<String>)> {
    let mut ballots: Vec<ParsedBallot> = Vec::new();
    let mut header_names: Vec<String> = Vec::new();

    let sources: Vec<(PathBuf, FileSource)> = match &args.input {
        Some(input) => {
            if config.ballots.is_some() || config.ballot_file_sources.is_some() {
                info!("--input overrides the ballots of the configuration");
            }
            vec![(PathBuf::new(), cli_file_source(args, input))]
        }
        None => {
            if let Some(inline) = &config.ballots {
                for (idx, selections) in inline.iter().enumerate() {
                    ballots.push(ParsedBallot {
                        id: Some(format!("inline-{:08}", idx + 1)),
                        selections: selections.clone(),
                    });
                }
            }
            config
                .ballot_file_sources
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|cfs| (root_path.to_path_buf(), cfs))
                .collect()
        }
    };

    for (root, cfs) in sources.iter() {
        let mut source = read_ballot_source(root, cfs)?;
        if header_names.is_empty() {
            header_names = source.header.clone();
        }
        ballots.append(&mut source.ballots);
    }
    Ok((ballots, header_names))
}

fn validate_rules(
    args: &Args,
    config: &TallyConfig,
    header_names: &[String],
    num_ballots: usize,
) -> TallyResult<ElectionConfig> {
    let candidates: Vec<String> = if !config.candidates.is_empty() {
        config.candidates.iter().map(|c| c.name.clone()).collect()
    } else if let Some(names) = &args.candidates {
        ElectionConfig::parse_candidates(names)
    } else {
        info!("Using the candidates of the ballot file: {:?}", header_names);
        header_names.to_vec()
    };

    let ballot_count = match config.rules.ballot_count {
        Some(c) => c,
        None => num_ballots as u32,
    };

    let calculation_mode = match args
        .calculation_mode
        .as_ref()
        .or(config.rules.calculation_mode.as_ref())
    {
        Some(s) => parse_calculation_mode(s)?,
        None => CalculationMode::default(),
    };
    let winner_rule = match args.winner_rule.as_ref().or(config.rules.winner_rule.as_ref()) {
        Some(s) => parse_winner_rule(s)?,
        None => WinnerRule::default(),
    };

    let res = ElectionConfig::new(&candidates, config.rules.seats_to_elect, ballot_count)
        .context(InvalidSetupSnafu {})?
        .with_criteria(config.rules.criteria())
        .with_calculation_mode(calculation_mode)
        .with_winner_rule(winner_rule);
    Ok(res)
}

fn build_summary_js(
    output: &OutputSettings,
    config: &ElectionConfig,
    res: &ElectionResults,
) -> JSValue {
    let tally: Vec<JSValue> = res
        .per_candidate_results
        .iter()
        .map(|cr| {
            json!({
                "name": cr.name,
                "votes": cr.vote_count,
                "percentage": cr.percentage,
                "elected": cr.is_winner,
            })
        })
        .collect();
    let winners: Vec<&String> = res.winners.iter().map(|cr| &cr.name).collect();
    let criteria = config.invalid_ballot_criteria;
    json!({
        "config": {
            "contest": output.contest_name,
            "date": output.contest_date,
            "jurisdiction": output.contest_jurisdiction,
            "office": output.contest_office,
            "seatsToElect": config.seats_to_elect,
            "ballotCount": config.ballot_count,
            "invalidBallotCriteria": {
                "moreThanRequired": criteria.more_than_required,
                "lessThanRequired": criteria.less_than_required,
                "blank": criteria.blank,
            },
            "calculationMode": calculation_mode_name(res.calculation_mode),
            "winnerRule": winner_rule_name(res.winner_rule),
        },
        "results": {
            "totalBallots": res.total_ballots,
            "validBallots": res.valid_ballot_count,
            "invalidBallots": res.invalid_ballot_count,
            "totalValidSelections": res.total_valid_selections,
            "denominator": res.denominator,
            "validityNote": res.validity_note,
            "tally": tally,
            "winners": winners,
        }
    })
}

fn print_results(output: &OutputSettings, res: &ElectionResults) {
    if !output.contest_name.is_empty() {
        println!("{}", output.contest_name);
    }
    println!(
        "Ballots: {} total, {} valid, {} invalid",
        res.total_ballots, res.valid_ballot_count, res.invalid_ballot_count
    );
    println!("{}", res.validity_note);
    for cr in res.per_candidate_results.iter() {
        println!(
            "{:>8} {:>8}  {}{}",
            cr.vote_count,
            cr.percentage,
            cr.name,
            if cr.is_winner { " -> elected" } else { "" }
        );
    }
    if res.winners.is_empty() {
        println!("No candidate is elected");
    } else {
        let names: Vec<&str> = res.winners.iter().map(|cr| cr.name.as_str()).collect();
        println!("Elected: {}", names.join(", "));
    }
}

fn write_summary(path: &str, output: &OutputSettings, pretty_js_stats: &str) -> TallyResult<()> {
    if path == "stdout" {
        println!("{}", pretty_js_stats);
        return Ok(());
    }
    let p: PathBuf = match &output.output_directory {
        Some(dir) if Path::new(path).is_relative() => Path::new(dir).join(path),
        _ => PathBuf::from(path),
    };
    info!("Writing summary to {:?}", p);
    fs::write(&p, pretty_js_stats).context(WritingOutputSnafu {
        path: p.display().to_string(),
    })?;
    Ok(())
}

/// Loads an election, computes its results, prints them and optionally writes or checks
/// the JSON summary.
pub fn run_election(args: &Args) -> TallyResult<ElectionResults> {
    let (config, root_path): (TallyConfig, PathBuf) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (cli_config(args)?, PathBuf::new()),
    };
    debug!("config: {:?}", config);

    let (parsed_ballots, header_names) = load_ballots(args, &config, &root_path)?;
    info!("Read {} ballots", parsed_ballots.len());

    let election = validate_rules(args, &config, &header_names, parsed_ballots.len())?;
    info!("election: {:?}", election);

    let ballots: Vec<Ballot> = parsed_ballots
        .into_iter()
        .map(|pb| {
            debug!("ballot {:?}: {:?}", pb.id, pb.selections);
            Ballot::from(pb.selections)
        })
        .collect();

    let result = match compute_results(&election, &ballots) {
        Some(x) => x,
        None => whatever!("The results cannot be computed without candidates"),
    };
    print_results(&config.output_settings, &result);

    let result_js = build_summary_js(&config.output_settings, &election, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = &args.out {
        write_summary(out, &config.output_settings, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
        info!("The results match the reference summary {}", summary_p);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> String {
        format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"))
    }

    fn empty_args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: None,
            input_type: None,
            candidates: None,
            seats: None,
            calculation_mode: None,
            winner_rule: None,
            excel_worksheet_name: None,
            verbose: false,
        }
    }

    fn test_wrapper(test_name: &str) -> ElectionResults {
        let _ = env_logger::builder().is_test(true).try_init();
        let args = Args {
            config: Some(format!("{}/{}/{}_config.json", test_dir(), test_name, test_name)),
            reference: Some(format!(
                "{}/{}/{}_expected_summary.json",
                test_dir(),
                test_name,
                test_name
            )),
            ..empty_args()
        };
        match run_election(&args) {
            Ok(res) => res,
            Err(e) => panic!("{}: {}", test_name, e),
        }
    }

    #[test]
    fn inline_ballots() {
        let res = test_wrapper("inline_ballots");
        assert_eq!(res.valid_ballot_count, 3);
    }

    #[test]
    fn grid_csv() {
        let res = test_wrapper("grid_csv");
        assert_eq!(res.total_ballots, 6);
    }

    #[test]
    fn list_csv_with_missing_ballots() {
        let res = test_wrapper("list_csv");
        assert_eq!(res.total_ballots, 6);
        assert_eq!(res.invalid_ballot_count, 3);
    }

    #[test]
    fn grid_xlsx() {
        let res = test_wrapper("grid_xlsx");
        // The second ballot is marked with a boolean and a number.
        assert_eq!(res.valid_ballot_count, 2);
        assert_eq!(res.winners.len(), 1);
    }

    #[test]
    fn grid_csv_with_byte_order_mark() {
        let res = test_wrapper("bom_csv");
        assert_eq!(res.per_candidate_results[0].name, "Alice");
        assert_eq!(res.per_candidate_results[0].vote_count, 2);
    }

    #[test]
    fn grid_header_with_empty_column() {
        let _ = env_logger::builder().is_test(true).try_init();
        let args = Args {
            input: Some(format!("{}/trailing_column/ballots.csv", test_dir())),
            seats: Some(1),
            ..empty_args()
        };
        let res = run_election(&args).unwrap();
        let names: Vec<&str> = res
            .per_candidate_results
            .iter()
            .map(|cr| cr.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(res.per_candidate_results[0].vote_count, 2);
        assert_eq!(res.valid_ballot_count, 3);
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let args = Args {
            config: Some(format!("{}/grid_csv/grid_csv_config.json", test_dir())),
            reference: Some(format!(
                "{}/list_csv/list_csv_expected_summary.json",
                test_dir()
            )),
            ..empty_args()
        };
        assert!(run_election(&args).is_err());
    }

    #[test]
    fn command_line_only() {
        let args = Args {
            input: Some(format!("{}/grid_csv/ballots.csv", test_dir())),
            seats: Some(2),
            calculation_mode: Some("validBallots".to_string()),
            ..empty_args()
        };
        let res = run_election(&args).unwrap();
        // The candidates come from the header of the grid.
        let names: Vec<&str> = res
            .per_candidate_results
            .iter()
            .map(|cr| cr.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "Clara", "Bob"]);
        assert_eq!(res.valid_ballot_count, 4);
        assert_eq!(res.denominator, 4);
    }

    #[test]
    fn command_line_overrides_the_config() {
        let args = Args {
            config: Some(format!(
                "{}/inline_ballots/inline_ballots_config.json",
                test_dir()
            )),
            calculation_mode: Some("totalBallots".to_string()),
            ..empty_args()
        };
        let res = run_election(&args).unwrap();
        assert_eq!(res.calculation_mode, CalculationMode::TotalBallots);
        assert_eq!(res.per_candidate_results[0].percentage, "50.00%");
        assert!(res.winners.is_empty());
    }

    #[test]
    fn bad_setups() {
        let args = Args {
            input: Some(format!("{}/grid_csv/ballots.csv", test_dir())),
            seats: Some(4),
            ..empty_args()
        };
        assert!(matches!(
            run_election(&args),
            Err(TallyError::InvalidSetup { .. })
        ));

        let args = Args {
            input: Some(format!("{}/grid_csv/ballots.csv", test_dir())),
            ..empty_args()
        };
        assert!(run_election(&args).is_err());

        let args = Args {
            input: Some(format!("{}/grid_csv/ballots.csv", test_dir())),
            input_type: Some("pdf".to_string()),
            seats: Some(1),
            ..empty_args()
        };
        assert!(run_election(&args).is_err());
    }
}
