//! Bracket operations: generation, result recording, status queries.

mod advance;
mod generate;
mod status;

pub use advance::{advance, record_result, AdvanceOutcome};
pub use generate::{generate, generate_with_rng};
pub use status::{
    champion, current_round, find_match, is_complete, is_round_complete, matches_by_round,
    ready_matches, runner_up, tournament_status,
};
