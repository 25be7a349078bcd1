//! Bracket generation: seed teams randomly and lay out every round up front.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Bracket, BracketError, BracketMatch, Round, Team};

/// Generate a bracket for 2, 4, 8, 16 or 32 teams, seeded with the thread-local RNG.
pub fn generate(teams: Vec<Team>) -> Result<Bracket, BracketError> {
    generate_with_rng(teams, &mut rand::thread_rng())
}

/// Generate a bracket, seeding with the given RNG.
///
/// 1. Check the team count and that team ids are distinct.
/// 2. Shuffle the teams (uniform random seeding).
/// 3. Pair consecutive teams into the opening round: teams `2i` and `2i + 1` play match `i + 1`.
/// 4. Add empty matches for every later round down to the final.
pub fn generate_with_rng<R: Rng + ?Sized>(
    mut teams: Vec<Team>,
    rng: &mut R,
) -> Result<Bracket, BracketError> {
    let initial_round = Round::for_team_count(teams.len())
        .ok_or(BracketError::InvalidTeamCount { count: teams.len() })?;

    let mut ids = HashSet::new();
    if let Some(dup) = teams.iter().find(|t| !ids.insert(t.id)) {
        return Err(BracketError::DuplicateTeam(dup.id));
    }

    teams.shuffle(rng);

    let mut matches = Vec::with_capacity(teams.len() - 1);
    let mut seeded = teams.into_iter();
    let mut match_number = 1;
    while let (Some(team_1), Some(team_2)) = (seeded.next(), seeded.next()) {
        matches.push(BracketMatch::seeded(initial_round, match_number, team_1, team_2));
        match_number += 1;
    }

    for round in initial_round.sequence_from().skip(1) {
        matches.extend((1..=round.match_count()).map(|n| BracketMatch::stub(round, n)));
    }

    let bracket = Bracket::from_matches(matches)?;
    log::debug!(
        "Generated {}-team bracket starting at {} ({} matches)",
        bracket.team_count(),
        initial_round,
        bracket.matches().len()
    );
    Ok(bracket)
}
