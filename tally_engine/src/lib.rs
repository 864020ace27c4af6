pub mod builder;
mod config;
pub mod manual;

use log::{debug, info, warn};

use std::{collections::HashMap, ops::AddAssign};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

/// Computes the results of an election from a snapshot of its ballots.
///
/// Arguments:
/// * `config` the setup of the election. It does not need to be validated.
/// * `ballots` the ballot slots, by position. Slots that are missing at the end are
/// counted as blank ballots. Entries beyond `config.ballot_count` are not counted.
///
/// Returns `None` when there is no candidate. Every other input produces results.
/// The results are recomputed from scratch at each call: after changing the
/// calculation mode, call this function again.
pub fn compute_results(config: &ElectionConfig, ballots: &[Ballot]) -> Option<ElectionResults> {
    info!(
        "compute_results: {} ballot slots ({} recorded), {} candidates, {} seats, criteria: {:?}, mode: {:?}, rule: {:?}",
        config.ballot_count,
        ballots.len(),
        config.candidates.len(),
        config.seats_to_elect,
        config.invalid_ballot_criteria,
        config.calculation_mode,
        config.winner_rule
    );
    if config.candidates.is_empty() {
        info!("compute_results: no candidates, the results cannot be computed");
        return None;
    }
    if ballots.len() > config.ballot_count as usize {
        warn!(
            "compute_results: {} ballots recorded but only {} slots configured, the extra ballots are not counted",
            ballots.len(),
            config.ballot_count
        );
    }

    let tally = aggregate(
        ballots,
        config.ballot_count,
        &config.candidates,
        &config.invalid_ballot_criteria,
        config.seats_to_elect,
    );
    let per_candidate_results = rank(
        &tally,
        config.ballot_count,
        config.calculation_mode,
        config.seats_to_elect,
        config.winner_rule,
    );
    for cr in per_candidate_results.iter() {
        info!(
            "Candidate: {}: {} ({}){}",
            cr.name,
            cr.vote_count,
            cr.percentage,
            if cr.is_winner { " -> elected" } else { "" }
        );
    }

    let winners: Vec<CandidateResult> = per_candidate_results
        .iter()
        .filter(|cr| cr.is_winner)
        .cloned()
        .collect();
    let total_ballots = config.ballot_count as u64;
    Some(ElectionResults {
        per_candidate_results,
        total_valid_selections: tally.total_valid_selections,
        total_ballots,
        valid_ballot_count: tally.valid_ballots,
        invalid_ballot_count: total_ballots - tally.valid_ballots,
        validity_note: synthesize_note(&config.invalid_ballot_criteria, config.seats_to_elect),
        winners,
        calculation_mode: config.calculation_mode,
        winner_rule: config.winner_rule,
        denominator: percentage_denominator(
            config.calculation_mode,
            config.ballot_count,
            tally.valid_ballots,
        ),
    })
}

/// Decides if a ballot counts towards the tally.
///
/// A missing ballot is treated as a blank one. Selections of unknown candidates
/// still count towards the number of selections.
pub fn is_valid_ballot(
    ballot: Option<&Ballot>,
    criteria: &InvalidBallotCriteria,
    seats_to_elect: u32,
) -> bool {
    let num_selections = ballot.map(|b| b.selection_count()).unwrap_or(0);
    let seats = seats_to_elect as usize;
    let over = criteria.more_than_required && num_selections > seats;
    let under = criteria.less_than_required && num_selections > 0 && num_selections < seats;
    let blank = criteria.blank && num_selections == 0;
    !(over || under || blank)
}

/// Counts the selections of the valid ballots.
///
/// Exactly `ballot_count` slots are considered. Invalid ballots are skipped as a whole,
/// and selections of names that are not in `candidates` are dropped.
pub fn aggregate(
    ballots: &[Ballot],
    ballot_count: u32,
    candidates: &[String],
    criteria: &InvalidBallotCriteria,
    seats_to_elect: u32,
) -> Tally {
    // The first registration wins if a name is repeated.
    let mut candidate_ids: HashMap<&str, CandidateId> = HashMap::new();
    for (idx, name) in candidates.iter().enumerate() {
        candidate_ids
            .entry(name.as_str())
            .or_insert(CandidateId(idx as u32));
    }

    let mut counts: Vec<VoteCount> = vec![VoteCount::EMPTY; candidates.len()];
    let mut valid_ballots: u64 = 0;
    for (idx, slot) in ballot_slots(ballots, ballot_count).enumerate() {
        if !is_valid_ballot(slot, criteria, seats_to_elect) {
            debug!("aggregate: ballot {} is invalid: {:?}", idx, slot);
            continue;
        }
        valid_ballots += 1;
        let selections = slot.map(|b| b.selections.as_slice()).unwrap_or(&[]);
        for name in selections.iter() {
            match candidate_ids.get(name.as_str()) {
                Some(cid) => counts[cid.0 as usize] += VoteCount::ONE,
                None => debug!(
                    "aggregate: ballot {}: ignoring selection of unknown candidate {:?}",
                    idx, name
                ),
            }
        }
    }

    let total_valid_selections: VoteCount = counts.iter().cloned().sum();
    debug!(
        "aggregate: valid ballots: {}, counts: {:?}",
        valid_ballots, counts
    );
    Tally {
        counts: candidates
            .iter()
            .cloned()
            .zip(counts.iter().map(|vc| vc.0))
            .collect(),
        valid_ballots,
        total_valid_selections: total_valid_selections.0,
    }
}

fn ballot_slots(ballots: &[Ballot], ballot_count: u32) -> impl Iterator<Item = Option<&Ballot>> {
    (0..ballot_count as usize).map(move |idx| ballots.get(idx))
}

/// The number the percentages and the majority threshold are relative to.
///
/// It falls back to 1 when there are no ballots, so that all the percentages are 0%.
pub fn percentage_denominator(
    calculation_mode: CalculationMode,
    ballot_count: u32,
    valid_ballots: u64,
) -> u64 {
    let d = match calculation_mode {
        CalculationMode::ValidBallots => valid_ballots,
        CalculationMode::TotalBallots => ballot_count as u64,
    };
    if d > 0 {
        d
    } else {
        1
    }
}

/// Sorts the tally, computes the percentages and flags the winners.
pub fn rank(
    tally: &Tally,
    ballot_count: u32,
    calculation_mode: CalculationMode,
    seats_to_elect: u32,
    winner_rule: WinnerRule,
) -> Vec<CandidateResult> {
    let denominator = percentage_denominator(calculation_mode, ballot_count, tally.valid_ballots);
    debug!("rank: denominator: {}", denominator);

    // Stable: equal counts keep the registration order.
    let mut sorted_tally: Vec<&(String, u64)> = tally.counts.iter().collect();
    sorted_tally.sort_by(|(_, vc1), (_, vc2)| vc2.cmp(vc1));

    sorted_tally
        .iter()
        .enumerate()
        .map(|(position, (name, vote_count))| {
            let has_majority = denominator > 0 && 2 * *vote_count > denominator;
            let is_winner = match winner_rule {
                WinnerRule::TopGroupMajority => {
                    position < seats_to_elect as usize && has_majority
                }
                WinnerRule::SimpleMajority => has_majority,
            };
            CandidateResult {
                name: name.clone(),
                vote_count: *vote_count,
                percentage: format_percentage(*vote_count, denominator),
                is_winner,
            }
        })
        .collect()
}

/// Formats `count / denominator` as a percentage with two decimals, rounding half up.
pub fn format_percentage(count: u64, denominator: u64) -> String {
    let denominator = denominator.max(1) as u128;
    // In hundredths of a percent.
    let hundredths = (count as u128 * 20_000 + denominator) / (2 * denominator);
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}

/// Describes the invalidity rules currently in force.
pub fn synthesize_note(criteria: &InvalidBallotCriteria, seats_to_elect: u32) -> String {
    let noun = candidate_noun(seats_to_elect);
    let mut rules: Vec<String> = Vec::new();
    if criteria.more_than_required {
        rules.push(format!("selected more than {} {}", seats_to_elect, noun));
    }
    if criteria.less_than_required {
        rules.push(format!(
            "selected fewer than {} {} (but not blank)",
            seats_to_elect, noun
        ));
    }
    if criteria.blank {
        rules.push("left blank".to_string());
    }
    match criteria.enabled_count() {
        0 => "All ballots are considered valid under the current setup.".to_string(),
        3 => format!(
            "A ballot is valid only if it selects exactly {} {}.",
            seats_to_elect, noun
        ),
        _ => format!("Invalid ballots: {}.", rules.join("; ")),
    }
}

fn candidate_noun(n: u32) -> &'static str {
    if n == 1 {
        "candidate"
    } else {
        "candidates"
    }
}
