// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// The choices marked on one ballot slot.
///
/// Selections are candidate names. The entry UI never records the same name twice,
/// but data loaded from files may contain duplicates or names that are not registered
/// candidates. Both still count towards the number of selections of the ballot.
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash)]
pub struct Ballot {
    pub selections: Vec<String>,
}

impl Ballot {
    pub fn new(selections: &[&str]) -> Ballot {
        Ballot {
            selections: selections.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A ballot without any selection.
    pub fn blank() -> Ballot {
        Ballot::default()
    }

    pub fn selection_count(&self) -> usize {
        self.selections.len()
    }

    pub fn is_blank(&self) -> bool {
        self.selections.is_empty()
    }
}

impl From<Vec<String>> for Ballot {
    fn from(selections: Vec<String>) -> Ballot {
        Ballot { selections }
    }
}

// ********* Configuration **********

/// The rules that make a ballot invalid. Every rule can be switched on or off independently.
///
/// When all the rules are off, every ballot is valid, including blank ones.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct InvalidBallotCriteria {
    /// The ballot selects more candidates than there are seats.
    pub more_than_required: bool,
    /// The ballot selects at least one candidate, but fewer than there are seats.
    pub less_than_required: bool,
    /// The ballot selects nobody.
    pub blank: bool,
}

impl InvalidBallotCriteria {
    pub const ALL: InvalidBallotCriteria = InvalidBallotCriteria {
        more_than_required: true,
        less_than_required: true,
        blank: true,
    };

    pub const NONE: InvalidBallotCriteria = InvalidBallotCriteria {
        more_than_required: false,
        less_than_required: false,
        blank: false,
    };

    /// The number of rules switched on, from 0 to 3.
    pub fn enabled_count(&self) -> usize {
        [self.more_than_required, self.less_than_required, self.blank]
            .iter()
            .filter(|b| **b)
            .count()
    }
}

impl Default for InvalidBallotCriteria {
    fn default() -> Self {
        InvalidBallotCriteria::ALL
    }
}

/// The denominator used for the percentages (and for the majority threshold).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum CalculationMode {
    /// All the ballot slots of the election, valid or not.
    #[default]
    TotalBallots,
    /// Only the ballots that passed the validity rules.
    ValidBallots,
}

/// How the winners are picked once the candidates are sorted.
///
/// Both rules require a strict majority of the denominator. They only differ in
/// whether the number of seats caps the number of winners.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum WinnerRule {
    /// Winners must be among the first `seats_to_elect` candidates of the sorted
    /// results and have strictly more than half of the denominator.
    #[default]
    TopGroupMajority,
    /// Any candidate with strictly more than 50% is a winner.
    SimpleMajority,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionConfig {
    /// The registered candidates. The order is the display order and breaks ties.
    pub candidates: Vec<String>,
    /// Number of seats, which is also the number of selections a valid ballot contains.
    pub seats_to_elect: u32,
    /// Number of ballot slots that are counted.
    pub ballot_count: u32,
    pub invalid_ballot_criteria: InvalidBallotCriteria,
    pub calculation_mode: CalculationMode,
    pub winner_rule: WinnerRule,
}

impl ElectionConfig {
    /// Creates a checked configuration with the default rules: all the invalidity
    /// criteria are on, percentages are relative to all the ballots and the winners
    /// are chosen with [WinnerRule::TopGroupMajority].
    pub fn new(
        candidates: &[String],
        seats_to_elect: u32,
        ballot_count: u32,
    ) -> Result<ElectionConfig, TallyErrors> {
        let config = ElectionConfig {
            candidates: candidates.to_vec(),
            seats_to_elect,
            ballot_count,
            invalid_ballot_criteria: InvalidBallotCriteria::default(),
            calculation_mode: CalculationMode::default(),
            winner_rule: WinnerRule::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Splits a comma-separated list of candidate names, as typed by an operator.
    ///
    /// ```
    /// use tally_engine::ElectionConfig;
    /// let names = ElectionConfig::parse_candidates(" Alice, Bob ,,Clara ");
    /// assert_eq!(names, vec!["Alice", "Bob", "Clara"]);
    /// ```
    pub fn parse_candidates(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    pub fn with_criteria(self, criteria: InvalidBallotCriteria) -> ElectionConfig {
        ElectionConfig {
            invalid_ballot_criteria: criteria,
            ..self
        }
    }

    pub fn with_calculation_mode(self, mode: CalculationMode) -> ElectionConfig {
        ElectionConfig {
            calculation_mode: mode,
            ..self
        }
    }

    pub fn with_winner_rule(self, rule: WinnerRule) -> ElectionConfig {
        ElectionConfig {
            winner_rule: rule,
            ..self
        }
    }

    /// Checks the invariants expected from the setup step.
    ///
    /// The computation of the results does not require them and never calls this.
    pub fn validate(&self) -> Result<(), TallyErrors> {
        if self.candidates.is_empty() {
            return Err(TallyErrors::NotEnoughCandidates);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for name in self.candidates.iter() {
            if name.trim().is_empty() {
                return Err(TallyErrors::EmptyCandidateName);
            }
            if !seen.insert(name.as_str()) {
                return Err(TallyErrors::DuplicateCandidate(name.clone()));
            }
        }
        if self.seats_to_elect == 0 || self.seats_to_elect as usize > self.candidates.len() {
            return Err(TallyErrors::InvalidSeatCount {
                seats_to_elect: self.seats_to_elect,
                num_candidates: self.candidates.len(),
            });
        }
        Ok(())
    }
}

// ******** Output data structures *********

/// The raw counts, before sorting and percentages.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tally {
    /// Vote counts in registration order, including the candidates nobody selected.
    pub counts: Vec<(String, u64)>,
    pub valid_ballots: u64,
    pub total_valid_selections: u64,
}

/// The outcome for a single candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateResult {
    pub name: String,
    pub vote_count: u64,
    /// Share of the denominator, with two decimals and a trailing `%` (e.g. `66.67%`).
    pub percentage: String,
    pub is_winner: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResults {
    /// Sorted by decreasing number of votes. Candidates with the same number of votes
    /// stay in registration order.
    pub per_candidate_results: Vec<CandidateResult>,
    pub total_valid_selections: u64,
    pub total_ballots: u64,
    pub valid_ballot_count: u64,
    pub invalid_ballot_count: u64,
    pub validity_note: String,
    /// The winning entries of `per_candidate_results`, in the same order.
    pub winners: Vec<CandidateResult>,
    pub calculation_mode: CalculationMode,
    pub winner_rule: WinnerRule,
    /// The number the percentages are relative to. Never zero.
    pub denominator: u64,
}

/// Errors raised when setting up or filling an election.
///
/// Computing the results never fails.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    NotEnoughCandidates,
    EmptyCandidateName,
    DuplicateCandidate(String),
    InvalidSeatCount {
        seats_to_elect: u32,
        num_candidates: usize,
    },
    BallotOutOfRange {
        index: usize,
        ballot_count: u32,
    },
    UnknownCandidate(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::NotEnoughCandidates => write!(f, "at least one candidate is required"),
            TallyErrors::EmptyCandidateName => write!(f, "candidate names cannot be empty"),
            TallyErrors::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is registered more than once", name)
            }
            TallyErrors::InvalidSeatCount {
                seats_to_elect,
                num_candidates,
            } => write!(
                f,
                "the number of seats must be between 1 and {}, got {}",
                num_candidates, seats_to_elect
            ),
            TallyErrors::BallotOutOfRange {
                index,
                ballot_count,
            } => write!(
                f,
                "ballot index {} is out of range (the election has {} ballots)",
                index, ballot_count
            ),
            TallyErrors::UnknownCandidate(name) => write!(f, "unknown candidate {:?}", name),
        }
    }
}
