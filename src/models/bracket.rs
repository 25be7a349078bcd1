//! Bracket, BracketMatch and the per-match state machine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::error::BracketError;
use crate::models::round::{feeder_side, next_match_number, Round};
use crate::models::team::{Team, TeamId};

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::One => f.write_str("team 1"),
            Side::Two => f.write_str("team 2"),
        }
    }
}

/// Where a match is in its lifecycle, with the data that exists at that point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchState {
    /// At least one slot is still waiting for a winner from the previous round.
    Unscheduled {
        team_1: Option<Team>,
        team_2: Option<Team>,
    },
    /// Both teams known, no result yet.
    Ready { team_1: Team, team_2: Team },
    /// Result recorded. Terminal.
    Decided {
        team_1: Team,
        team_2: Team,
        winner: Side,
    },
}

impl MatchState {
    pub fn empty() -> Self {
        MatchState::Unscheduled {
            team_1: None,
            team_2: None,
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self {
            MatchState::Unscheduled { .. } => MatchStatus::Unscheduled,
            MatchState::Ready { .. } => MatchStatus::Ready,
            MatchState::Decided { .. } => MatchStatus::Decided,
        }
    }

    /// Team in the given slot, if assigned.
    pub fn team(&self, side: Side) -> Option<&Team> {
        let (team_1, team_2) = match self {
            MatchState::Unscheduled { team_1, team_2 } => (team_1.as_ref(), team_2.as_ref()),
            MatchState::Ready { team_1, team_2 } | MatchState::Decided { team_1, team_2, .. } => {
                (Some(team_1), Some(team_2))
            }
        };
        match side {
            Side::One => team_1,
            Side::Two => team_2,
        }
    }

    /// Copy of this state with `team` placed in `side`. Filling the last empty slot makes the match ready.
    /// The caller checks the slot is free first.
    pub(crate) fn with_team(&self, side: Side, team: Team) -> MatchState {
        let mut slots = [self.team(Side::One).cloned(), self.team(Side::Two).cloned()];
        let idx = match side {
            Side::One => 0,
            Side::Two => 1,
        };
        slots[idx] = Some(team);
        match (self, slots) {
            (MatchState::Decided { winner, .. }, [Some(team_1), Some(team_2)]) => {
                MatchState::Decided {
                    team_1,
                    team_2,
                    winner: *winner,
                }
            }
            (_, [Some(team_1), Some(team_2)]) => MatchState::Ready { team_1, team_2 },
            (_, [team_1, team_2]) => MatchState::Unscheduled { team_1, team_2 },
        }
    }
}

/// Coarse lifecycle of a single match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Unscheduled,
    Ready,
    Decided,
}

/// Lifecycle of the whole bracket, driven only by match results.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Generated, no result recorded yet.
    Draft,
    InProgress,
    /// The final has a winner.
    Complete,
}

/// A single match in the bracket.
///
/// The next-match pointer is not stored: it is a function of round and match number, so a
/// match outside the final can't be without one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatchRecord", into = "MatchRecord")]
pub struct BracketMatch {
    id: MatchId,
    round: Round,
    /// 1-based, unique within the round.
    match_number: u32,
    state: MatchState,
}

/// Stored form of a [`BracketMatch`]. Carries the next-match pointer for readers of the
/// document; loading rejects any pointer that disagrees with the derived one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub round: Round,
    pub match_number: u32,
    pub next_match_number: Option<u32>,
    #[serde(flatten)]
    pub state: MatchState,
}

impl TryFrom<MatchRecord> for BracketMatch {
    type Error = BracketError;

    fn try_from(record: MatchRecord) -> Result<Self, Self::Error> {
        let m = BracketMatch {
            id: record.id,
            round: record.round,
            match_number: record.match_number,
            state: record.state,
        };
        if record.next_match_number != m.next_match_number() {
            return Err(malformed(format!(
                "{} match {} points to next match {:?}, expected {:?}",
                m.round,
                m.match_number,
                record.next_match_number,
                m.next_match_number()
            )));
        }
        Ok(m)
    }
}

impl From<BracketMatch> for MatchRecord {
    fn from(m: BracketMatch) -> Self {
        MatchRecord {
            next_match_number: m.next_match_number(),
            id: m.id,
            round: m.round,
            match_number: m.match_number,
            state: m.state,
        }
    }
}

impl BracketMatch {
    /// Match with both slots empty.
    pub(crate) fn stub(round: Round, match_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_number,
            state: MatchState::empty(),
        }
    }

    /// Opening-round match with both teams assigned.
    pub(crate) fn seeded(round: Round, match_number: u32, team_1: Team, team_2: Team) -> Self {
        Self {
            state: MatchState::Ready { team_1, team_2 },
            ..Self::stub(round, match_number)
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn match_number(&self) -> u32 {
        self.match_number
    }

    /// Match number in the next round that receives the winner. None only in the final.
    pub fn next_match_number(&self) -> Option<u32> {
        self.advances_to().map(|(_, number)| number)
    }

    /// Round and match number the winner moves into.
    pub fn advances_to(&self) -> Option<(Round, u32)> {
        self.round
            .next()
            .map(|next| (next, next_match_number(self.match_number)))
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub(crate) fn set_state(&mut self, state: MatchState) {
        self.state = state;
    }

    pub fn status(&self) -> MatchStatus {
        self.state.status()
    }

    pub fn team_1(&self) -> Option<&Team> {
        self.state.team(Side::One)
    }

    pub fn team_2(&self) -> Option<&Team> {
        self.state.team(Side::Two)
    }

    /// Which slot the given team occupies.
    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        [Side::One, Side::Two]
            .into_iter()
            .find(|&side| self.state.team(side).is_some_and(|t| t.id == team_id))
    }

    pub fn winner(&self) -> Option<&Team> {
        match &self.state {
            MatchState::Decided { winner, .. } => self.state.team(*winner),
            _ => None,
        }
    }

    pub fn loser(&self) -> Option<&Team> {
        match &self.state {
            MatchState::Decided { winner, .. } => self.state.team(winner.other()),
            _ => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.state, MatchState::Decided { .. })
    }
}

/// Persisted form of a [`Bracket`]. Loading one runs the full structural validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BracketDocument {
    pub matches: Vec<BracketMatch>,
}

/// Every match of a tournament, ordered by round then match number.
///
/// Only the crate's operations build or change a bracket, and each of them hands back a
/// new value. A bracket read from storage is checked by [`Bracket::from_matches`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BracketDocument", into = "BracketDocument")]
pub struct Bracket {
    initial_round: Round,
    matches: Vec<BracketMatch>,
}

impl Bracket {
    /// Build a bracket from its matches, checking every structural invariant.
    pub fn from_matches(mut matches: Vec<BracketMatch>) -> Result<Self, BracketError> {
        matches.sort_by_key(|m| (m.round, m.match_number));
        let initial_round = matches
            .first()
            .map(|m| m.round)
            .ok_or_else(|| malformed("bracket has no matches".to_string()))?;
        let bracket = Self {
            initial_round,
            matches,
        };
        bracket.validate()?;
        Ok(bracket)
    }

    fn validate(&self) -> Result<(), BracketError> {
        let expected_total = self.initial_round.team_count() - 1;
        if self.matches.len() != expected_total as usize {
            return Err(malformed(format!(
                "expected {} matches for {} teams, found {}",
                expected_total,
                self.initial_round.team_count(),
                self.matches.len()
            )));
        }

        let mut ids = HashSet::new();
        for m in &self.matches {
            if !ids.insert(m.id) {
                return Err(malformed(format!("match id {} appears twice", m.id)));
            }
        }

        for round in self.rounds() {
            let numbers: Vec<u32> = self.round_matches(round).map(|m| m.match_number).collect();
            let expected: Vec<u32> = (1..=round.match_count()).collect();
            if numbers != expected {
                return Err(malformed(format!(
                    "{} must hold matches 1..={}, found {:?}",
                    round,
                    round.match_count(),
                    numbers
                )));
            }
        }

        for m in &self.matches {
            if let MatchState::Unscheduled {
                team_1: Some(_),
                team_2: Some(_),
            } = m.state
            {
                return Err(malformed(format!(
                    "{} match {} has both teams but is not ready",
                    m.round, m.match_number
                )));
            }
        }

        self.validate_slots()
    }

    /// Opening round is fully seeded with distinct teams; every later slot holds exactly
    /// the winner of the match feeding it, or nothing while that match is undecided.
    fn validate_slots(&self) -> Result<(), BracketError> {
        let mut seen = HashSet::new();
        for m in self.round_matches(self.initial_round) {
            for side in [Side::One, Side::Two] {
                let team = m.state.team(side).ok_or_else(|| {
                    malformed(format!("opening match {} is missing {}", m.match_number, side))
                })?;
                if !seen.insert(team.id) {
                    return Err(malformed(format!("team {} is seeded twice", team.id)));
                }
            }
        }

        for feeder in &self.matches {
            let Some((next_round, target_number)) = feeder.advances_to() else {
                continue;
            };
            let target = self.find(next_round, target_number).ok_or(
                BracketError::NextMatchNotFound {
                    round: next_round,
                    match_number: target_number,
                },
            )?;
            let slot = target.state.team(feeder_side(feeder.match_number)).map(|t| t.id);
            let winner = feeder.winner().map(|t| t.id);
            if slot != winner {
                return Err(malformed(format!(
                    "{} match {} slot fed by {} match {} holds {:?}, expected {:?}",
                    next_round, target_number, feeder.round, feeder.match_number, slot, winner
                )));
            }
        }
        Ok(())
    }

    pub fn initial_round(&self) -> Round {
        self.initial_round
    }

    /// Number of teams seeded into the opening round.
    pub fn team_count(&self) -> u32 {
        self.initial_round.team_count()
    }

    /// Rounds present in this bracket, in play order.
    pub fn rounds(&self) -> impl Iterator<Item = Round> {
        self.initial_round.sequence_from()
    }

    pub fn matches(&self) -> &[BracketMatch] {
        &self.matches
    }

    pub fn get(&self, id: MatchId) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn find(&self, round: Round, match_number: u32) -> Option<&BracketMatch> {
        self.matches
            .iter()
            .find(|m| m.round == round && m.match_number == match_number)
    }

    pub(crate) fn round_matches(&self, round: Round) -> impl Iterator<Item = &BracketMatch> + '_ {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub(crate) fn position(&self, id: MatchId) -> Option<usize> {
        self.matches.iter().position(|m| m.id == id)
    }

    pub(crate) fn position_of(&self, round: Round, match_number: u32) -> Option<usize> {
        self.matches
            .iter()
            .position(|m| m.round == round && m.match_number == match_number)
    }

    pub(crate) fn match_at_mut(&mut self, idx: usize) -> &mut BracketMatch {
        &mut self.matches[idx]
    }

    /// Drop a match without revalidating, to build inconsistent brackets in tests.
    #[cfg(test)]
    pub(crate) fn remove_match(&mut self, round: Round, match_number: u32) -> Option<BracketMatch> {
        let idx = self.position_of(round, match_number)?;
        Some(self.matches.remove(idx))
    }
}

impl TryFrom<BracketDocument> for Bracket {
    type Error = BracketError;

    fn try_from(doc: BracketDocument) -> Result<Self, Self::Error> {
        Bracket::from_matches(doc.matches)
    }
}

impl From<Bracket> for BracketDocument {
    fn from(bracket: Bracket) -> Self {
        BracketDocument {
            matches: bracket.matches,
        }
    }
}

fn malformed(reason: String) -> BracketError {
    log::error!("Rejected malformed bracket: {}", reason);
    BracketError::MalformedBracket(reason)
}
