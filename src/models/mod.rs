//! Data structures for the bracket: teams, rounds, matches, errors.

mod bracket;
mod error;
mod round;
mod team;

pub use bracket::{
    Bracket, BracketDocument, BracketMatch, MatchId, MatchRecord, MatchState, MatchStatus,
    Side, TournamentStatus,
};
pub use error::{BracketError, ErrorClass};
pub use round::{ceil_div, feeder_side, next_match_number, Round};
pub use team::{Team, TeamId};
