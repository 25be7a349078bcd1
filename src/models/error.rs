//! Errors returned by bracket operations.

use crate::models::bracket::{MatchId, Side};
use crate::models::round::Round;
use crate::models::team::TeamId;

/// How a caller should react to a [`BracketError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Bad input from the caller. Report it, do not retry.
    InputValidation,
    /// Another result landed first. Re-read the bracket and retry the whole operation.
    StateConflict,
    /// The bracket itself is inconsistent. Never expected for a generated bracket.
    InternalConsistency,
}

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Team count is not 2, 4, 8, 16 or 32.
    InvalidTeamCount { count: usize },
    /// The same team id was entered twice.
    DuplicateTeam(TeamId),
    /// No match with this id in the bracket.
    MatchNotFound(MatchId),
    /// The match is still waiting for one or both teams.
    TeamsNotAssigned(MatchId),
    /// The reported winner is not playing in this match.
    InvalidWinner { match_id: MatchId, team_id: TeamId },
    /// The match was already decided in favor of another team.
    ConflictingWinner {
        match_id: MatchId,
        existing: TeamId,
        attempted: TeamId,
    },
    /// The match a winner should move into does not exist.
    NextMatchNotFound { round: Round, match_number: u32 },
    /// The winner's slot in the next match already holds a different team.
    SlotAlreadyOccupied {
        round: Round,
        match_number: u32,
        side: Side,
    },
    /// A stored bracket failed structural validation when loaded.
    MalformedBracket(String),
}

impl BracketError {
    pub fn class(&self) -> ErrorClass {
        use BracketError::*;
        match self {
            InvalidTeamCount { .. }
            | DuplicateTeam(_)
            | MatchNotFound(_)
            | TeamsNotAssigned(_)
            | InvalidWinner { .. } => ErrorClass::InputValidation,
            ConflictingWinner { .. } | SlotAlreadyOccupied { .. } => ErrorClass::StateConflict,
            NextMatchNotFound { .. } | MalformedBracket(_) => ErrorClass::InternalConsistency,
        }
    }

    /// True when re-reading the bracket and retrying may succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::StateConflict
    }
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InvalidTeamCount { count } => {
                write!(f, "A bracket needs 2, 4, 8, 16 or 32 teams (got {})", count)
            }
            BracketError::DuplicateTeam(id) => write!(f, "Team {} was entered more than once", id),
            BracketError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            BracketError::TeamsNotAssigned(id) => {
                write!(f, "Match {} does not have both teams assigned yet", id)
            }
            BracketError::InvalidWinner { match_id, team_id } => {
                write!(f, "Team {} is not playing in match {}", team_id, match_id)
            }
            BracketError::ConflictingWinner {
                match_id,
                existing,
                attempted,
            } => write!(
                f,
                "Match {} was already won by {} (attempted {})",
                match_id, existing, attempted
            ),
            BracketError::NextMatchNotFound {
                round,
                match_number,
            } => write!(f, "{} match {} does not exist", round, match_number),
            BracketError::SlotAlreadyOccupied {
                round,
                match_number,
                side,
            } => write!(
                f,
                "{} match {} already has a different team in slot {}",
                round, match_number, side
            ),
            BracketError::MalformedBracket(reason) => write!(f, "Malformed bracket: {}", reason),
        }
    }
}

impl std::error::Error for BracketError {}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn only_state_conflicts_are_retryable() {
        let id = Uuid::new_v4();
        assert!(BracketError::ConflictingWinner {
            match_id: id,
            existing: id,
            attempted: id
        }
        .is_retryable());
        assert!(BracketError::SlotAlreadyOccupied {
            round: Round::Final,
            match_number: 1,
            side: Side::Two
        }
        .is_retryable());
        assert!(!BracketError::MatchNotFound(id).is_retryable());
        assert_eq!(
            BracketError::NextMatchNotFound {
                round: Round::Final,
                match_number: 1
            }
            .class(),
            ErrorClass::InternalConsistency
        );
    }
}
