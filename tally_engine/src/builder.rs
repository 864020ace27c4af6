pub use crate::config::*;

use log::debug;

/// Holds the ballots of one counting session while they are being marked.
///
/// The builder only stores data. The results are computed from scratch each time
/// [Builder::results] is called.
///
/// ```
/// pub use tally_engine::builder::Builder;
/// pub use tally_engine::{CalculationMode, ElectionConfig};
/// # use tally_engine::TallyErrors;
///
/// let config = ElectionConfig::new(&["Anna".to_string(), "Bob".to_string()], 1, 3)?;
/// let mut builder = Builder::new(&config)?;
///
/// builder.toggle_selection(0, "Anna")?;
/// builder.toggle_selection(1, "Anna")?;
/// builder.toggle_selection(2, "Bob")?;
///
/// builder.set_calculation_mode(CalculationMode::ValidBallots);
/// let results = builder.results().unwrap();
/// assert_eq!(results.winners[0].name, "Anna");
/// assert_eq!(results.winners[0].percentage, "66.67%");
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _config: ElectionConfig,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    /// Starts a session with one blank ballot per slot.
    pub fn new(config: &ElectionConfig) -> Result<Builder, TallyErrors> {
        config.validate()?;
        Ok(Builder {
            _config: config.clone(),
            _ballots: vec![Ballot::blank(); config.ballot_count as usize],
        })
    }

    pub fn config(&self) -> &ElectionConfig {
        &self._config
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self._ballots
    }

    /// Marks or unmarks a candidate on a ballot, the way an operator clicks a cell.
    ///
    /// A candidate already on the ballot is removed. Otherwise it is added, unless the
    /// ballot already holds as many selections as there are seats, in which case
    /// nothing changes.
    ///
    /// Returns whether the candidate is selected on the ballot after the call.
    pub fn toggle_selection(
        &mut self,
        ballot_index: usize,
        candidate: &str,
    ) -> Result<bool, TallyErrors> {
        if !self._config.candidates.iter().any(|c| c == candidate) {
            return Err(TallyErrors::UnknownCandidate(candidate.to_string()));
        }
        let seats = self._config.seats_to_elect as usize;
        let ballot = self.ballot_mut(ballot_index)?;
        if let Some(pos) = ballot.selections.iter().position(|c| c == candidate) {
            ballot.selections.remove(pos);
            debug!(
                "toggle_selection: ballot {}: removed {:?}",
                ballot_index, candidate
            );
            return Ok(false);
        }
        if ballot.selection_count() < seats {
            ballot.selections.push(candidate.to_string());
            debug!(
                "toggle_selection: ballot {}: added {:?}",
                ballot_index, candidate
            );
            return Ok(true);
        }
        debug!(
            "toggle_selection: ballot {} is full, {:?} not added",
            ballot_index, candidate
        );
        Ok(false)
    }

    /// Replaces the content of a ballot without any check on the selections.
    ///
    /// This is meant for ballots loaded from files. The validity rules take care of
    /// the ballots that do not respect the number of seats.
    pub fn set_ballot(&mut self, ballot_index: usize, ballot: Ballot) -> Result<(), TallyErrors> {
        *self.ballot_mut(ballot_index)? = ballot;
        Ok(())
    }

    pub fn set_calculation_mode(&mut self, mode: CalculationMode) {
        self._config.calculation_mode = mode;
    }

    pub fn results(&self) -> Option<ElectionResults> {
        crate::compute_results(&self._config, &self._ballots)
    }

    fn ballot_mut(&mut self, ballot_index: usize) -> Result<&mut Ballot, TallyErrors> {
        let ballot_count = self._config.ballot_count;
        self._ballots
            .get_mut(ballot_index)
            .ok_or(TallyErrors::BallotOutOfRange {
                index: ballot_index,
                ballot_count,
            })
    }
}
