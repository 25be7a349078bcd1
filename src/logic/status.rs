//! Read-only views of a bracket: round progress, current round, champion and runner-up.

use crate::models::{Bracket, BracketMatch, MatchStatus, Round, Team, TournamentStatus};

/// True iff every match of `round` has a winner. Rounds not in this bracket have no matches
/// and count as complete.
pub fn is_round_complete(bracket: &Bracket, round: Round) -> bool {
    bracket.round_matches(round).all(BracketMatch::is_decided)
}

/// First round that still has undecided matches. None once the final is decided.
pub fn current_round(bracket: &Bracket) -> Option<Round> {
    bracket
        .rounds()
        .find(|&round| !is_round_complete(bracket, round))
}

/// True iff the final has a winner.
pub fn is_complete(bracket: &Bracket) -> bool {
    final_match(bracket).is_some_and(BracketMatch::is_decided)
}

/// Winner of the final.
pub fn champion(bracket: &Bracket) -> Option<&Team> {
    final_match(bracket).and_then(BracketMatch::winner)
}

/// Loser of the final.
pub fn runner_up(bracket: &Bracket) -> Option<&Team> {
    final_match(bracket).and_then(BracketMatch::loser)
}

/// Matches of `round`, in ascending match number.
pub fn matches_by_round(bracket: &Bracket, round: Round) -> Vec<&BracketMatch> {
    let mut matches: Vec<_> = bracket.round_matches(round).collect();
    matches.sort_by_key(|m| m.match_number());
    matches
}

/// Match at a given position in the bracket.
pub fn find_match(bracket: &Bracket, round: Round, match_number: u32) -> Option<&BracketMatch> {
    bracket.find(round, match_number)
}

/// Matches with both teams known and no result yet, in round then match order.
pub fn ready_matches(bracket: &Bracket) -> Vec<&BracketMatch> {
    bracket
        .matches()
        .iter()
        .filter(|m| m.status() == MatchStatus::Ready)
        .collect()
}

/// Draft until the first result, Complete once the final is decided.
pub fn tournament_status(bracket: &Bracket) -> TournamentStatus {
    if is_complete(bracket) {
        TournamentStatus::Complete
    } else if bracket.matches().iter().any(BracketMatch::is_decided) {
        TournamentStatus::InProgress
    } else {
        TournamentStatus::Draft
    }
}

fn final_match(bracket: &Bracket) -> Option<&BracketMatch> {
    bracket.find(Round::Final, 1)
}
