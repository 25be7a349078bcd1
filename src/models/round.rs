//! Round names and the ordering/pairing math shared by generation and advancement.

use serde::{Deserialize, Serialize};

use crate::models::bracket::Side;

/// Stage of a single-elimination bracket, in play order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Round {
    #[serde(rename = "round_of_32")]
    RoundOf32,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    #[serde(rename = "round_of_8")]
    RoundOf8,
    #[serde(rename = "semifinals")]
    Semifinals,
    #[serde(rename = "final")]
    Final,
}

impl Round {
    /// Every round in play order.
    pub const ALL: [Round; 5] = [
        Round::RoundOf32,
        Round::RoundOf16,
        Round::RoundOf8,
        Round::Semifinals,
        Round::Final,
    ];

    /// Opening round for a bracket of `team_count` teams. None unless the count is 2, 4, 8, 16 or 32.
    pub fn for_team_count(team_count: usize) -> Option<Round> {
        Self::ALL
            .into_iter()
            .find(|r| r.team_count() as usize == team_count)
    }

    /// Teams still alive when this round starts.
    pub fn team_count(self) -> u32 {
        match self {
            Round::RoundOf32 => 32,
            Round::RoundOf16 => 16,
            Round::RoundOf8 => 8,
            Round::Semifinals => 4,
            Round::Final => 2,
        }
    }

    /// Matches played in this round.
    pub fn match_count(self) -> u32 {
        self.team_count() / 2
    }

    /// The round winners of this round move into. None for the final.
    pub fn next(self) -> Option<Round> {
        match self {
            Round::RoundOf32 => Some(Round::RoundOf16),
            Round::RoundOf16 => Some(Round::RoundOf8),
            Round::RoundOf8 => Some(Round::Semifinals),
            Round::Semifinals => Some(Round::Final),
            Round::Final => None,
        }
    }

    pub fn is_final(self) -> bool {
        self == Round::Final
    }

    /// This round followed by every later round, ending with the final.
    pub fn sequence_from(self) -> impl Iterator<Item = Round> {
        std::iter::successors(Some(self), |r| r.next())
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Round::RoundOf32 => "Round of 32",
            Round::RoundOf16 => "Round of 16",
            Round::RoundOf8 => "Quarterfinals",
            Round::Semifinals => "Semifinals",
            Round::Final => "Final",
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer ceiling division. `d` must be non-zero.
pub const fn ceil_div(n: u32, d: u32) -> u32 {
    n.div_ceil(d)
}

/// Match number in the following round that receives the winner of `match_number`.
///
/// Matches `2k - 1` and `2k` both feed match `k`. For any 1-based input the result is at least 1.
pub const fn next_match_number(match_number: u32) -> u32 {
    ceil_div(match_number, 2)
}

/// Slot the winner of `match_number` takes in its next match: odd fills team 1, even fills team 2.
pub const fn feeder_side(match_number: u32) -> Side {
    if match_number % 2 == 1 {
        Side::One
    } else {
        Side::Two
    }
}
