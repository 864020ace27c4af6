use clap::Parser;

/// This is a tallying program for manually counted elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON format.
    /// See the manual of the tally_engine crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, mtally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the ballots are read from this file. Setting this option overrides
    /// the ballot sources of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv_grid) The type of the input: csv_grid, csv_list or xlsx_grid.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (comma-separated names) The candidates, when no configuration file is given.
    /// If not specified, the names are taken from the first row of a grid input.
    #[clap(long, value_parser)]
    pub candidates: Option<String>,

    /// (number) The number of seats, when no configuration file is given.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    /// (totalBallots or validBallots) Overrides the denominator of the percentages.
    #[clap(long, value_parser)]
    pub calculation_mode: Option<String>,

    /// (topGroupMajority or simpleMajority) Overrides the rule to pick the winners.
    #[clap(long, value_parser)]
    pub winner_rule: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first one is used otherwise.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
