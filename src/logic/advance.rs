//! Recording match results and moving winners into the next round.

use crate::models::{
    feeder_side, Bracket, BracketError, MatchId, MatchState, Round, Side, TeamId,
};

/// What [`record_result`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdvanceOutcome {
    /// The result was new and has been applied.
    Applied,
    /// The match already had this winner. Bracket returned unchanged.
    AlreadyDecided,
}

/// Record `winner_id` as the winner of `match_id` and move them into the next round.
///
/// Returns the new bracket. Reporting the same result twice returns an identical bracket.
pub fn advance(
    bracket: &Bracket,
    match_id: MatchId,
    winner_id: TeamId,
) -> Result<Bracket, BracketError> {
    record_result(bracket, match_id, winner_id).map(|(bracket, _)| bracket)
}

/// Like [`advance`], but also reports whether anything changed.
///
/// All-or-nothing: on error the input bracket is untouched and nothing else is produced.
/// `ConflictingWinner` and `SlotAlreadyOccupied` mean another result got there first;
/// re-read the bracket and retry.
pub fn record_result(
    bracket: &Bracket,
    match_id: MatchId,
    winner_id: TeamId,
) -> Result<(Bracket, AdvanceOutcome), BracketError> {
    let idx = bracket
        .position(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    let source = &bracket.matches()[idx];

    let (team_1, team_2, winner_side) = match source.state() {
        MatchState::Unscheduled { .. } => return Err(BracketError::TeamsNotAssigned(match_id)),
        MatchState::Decided {
            team_1,
            team_2,
            winner,
        } => {
            let existing = match winner {
                Side::One => team_1.id,
                Side::Two => team_2.id,
            };
            if existing == winner_id {
                return Ok((bracket.clone(), AdvanceOutcome::AlreadyDecided));
            }
            if source.side_of(winner_id).is_none() {
                return Err(BracketError::InvalidWinner {
                    match_id,
                    team_id: winner_id,
                });
            }
            return Err(BracketError::ConflictingWinner {
                match_id,
                existing,
                attempted: winner_id,
            });
        }
        MatchState::Ready { team_1, team_2 } => {
            let side = source.side_of(winner_id).ok_or(BracketError::InvalidWinner {
                match_id,
                team_id: winner_id,
            })?;
            (team_1.clone(), team_2.clone(), side)
        }
    };

    let round = source.round();
    let match_number = source.match_number();
    let winner = match winner_side {
        Side::One => team_1.clone(),
        Side::Two => team_2.clone(),
    };

    let mut next = bracket.clone();
    next.match_at_mut(idx).set_state(MatchState::Decided {
        team_1,
        team_2,
        winner: winner_side,
    });

    if let Some((next_round, next_number)) = source.advances_to() {
        let target_idx = next
            .position_of(next_round, next_number)
            .ok_or_else(|| next_match_missing(next_round, next_number))?;

        let side = feeder_side(match_number);
        let target = next.match_at_mut(target_idx);
        let occupant = target.state().team(side).map(|t| t.id);
        match occupant {
            Some(id) if id == winner.id => {}
            Some(_) => {
                return Err(BracketError::SlotAlreadyOccupied {
                    round: next_round,
                    match_number: next_number,
                    side,
                })
            }
            None => {
                let filled = target.state().with_team(side, winner.clone());
                target.set_state(filled);
            }
        }
    }

    log::debug!("{} match {} decided: {} wins", round, match_number, winner.name);
    Ok((next, AdvanceOutcome::Applied))
}

fn next_match_missing(round: Round, match_number: u32) -> BracketError {
    log::error!(
        "Bracket is inconsistent: {} match {} does not exist",
        round,
        match_number
    );
    BracketError::NextMatchNotFound {
        round,
        match_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::generate;
    use crate::models::Team;

    #[test]
    fn occupied_slot_rejects_a_different_team() {
        let teams: Vec<Team> = (0..8).map(|i| Team::new(format!("T{i}"))).collect();
        let mut bracket = generate(teams).unwrap();
        let quarter = bracket.find(Round::RoundOf8, 1).unwrap().clone();
        let intruder = bracket.find(Round::RoundOf8, 4).unwrap().team_1().unwrap().clone();

        let semi = bracket.position_of(Round::Semifinals, 1).unwrap();
        let blocked = MatchState::empty().with_team(Side::One, intruder);
        bracket.match_at_mut(semi).set_state(blocked);
        let before = bracket.clone();

        let winner = quarter.team_1().unwrap().id;
        assert_eq!(
            advance(&bracket, quarter.id(), winner),
            Err(BracketError::SlotAlreadyOccupied {
                round: Round::Semifinals,
                match_number: 1,
                side: Side::One,
            })
        );
        assert_eq!(bracket, before);
    }

    #[test]
    fn missing_destination_match_is_reported_not_repaired() {
        let teams: Vec<Team> = (0..8).map(|i| Team::new(format!("T{i}"))).collect();
        let mut bracket = generate(teams).unwrap();
        bracket.remove_match(Round::Semifinals, 1).unwrap();
        let before = bracket.clone();

        let quarter = bracket.find(Round::RoundOf8, 2).unwrap().clone();
        let winner = quarter.team_2().unwrap().id;
        let err = advance(&bracket, quarter.id(), winner).unwrap_err();
        assert_eq!(
            err,
            BracketError::NextMatchNotFound {
                round: Round::Semifinals,
                match_number: 1,
            }
        );
        assert_eq!(err.class(), crate::models::ErrorClass::InternalConsistency);
        assert_eq!(bracket, before);
        assert!(bracket.find(Round::Semifinals, 1).is_none());
    }

    #[test]
    fn slot_already_holding_the_winner_is_accepted() {
        let teams: Vec<Team> = (0..4).map(|i| Team::new(format!("T{i}"))).collect();
        let mut bracket = generate(teams).unwrap();
        let semi = bracket.find(Round::Semifinals, 2).unwrap().clone();
        let winner = semi.team_2().unwrap().clone();

        let final_idx = bracket.position_of(Round::Final, 1).unwrap();
        let prefilled = MatchState::empty().with_team(Side::Two, winner.clone());
        bracket.match_at_mut(final_idx).set_state(prefilled);

        let (next, outcome) = record_result(&bracket, semi.id(), winner.id).unwrap();
        assert_eq!(outcome, AdvanceOutcome::Applied);
        let final_match = next.find(Round::Final, 1).unwrap();
        assert_eq!(final_match.team_2().map(|t| t.id), Some(winner.id));
        assert!(final_match.team_1().is_none());
    }
}
