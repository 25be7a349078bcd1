//! Single-elimination bracket engine: library with models and bracket logic.
//!
//! Every operation takes a [`Bracket`] by reference and returns a new one (or an error),
//! so the host decides where brackets live and how concurrent results are serialized.

pub mod logic;
pub mod models;

pub use logic::{
    advance, champion, current_round, find_match, generate, generate_with_rng, is_complete,
    is_round_complete, matches_by_round, ready_matches, record_result, runner_up,
    tournament_status, AdvanceOutcome,
};
pub use models::{
    Bracket, BracketDocument, BracketError, BracketMatch, ErrorClass, MatchId, MatchRecord,
    MatchState, MatchStatus, Round, Side, Team, TeamId, TournamentStatus,
};
