//! Team: the only input the engine takes from the host.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and result reports).
pub type TeamId = Uuid;

/// A team entered into the bracket.
///
/// `visuals` is opaque host data (jersey colors, logo url, ...). The engine
/// never looks inside it, it is only carried along with the team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub visuals: serde_json::Value,
}

impl Team {
    /// Create a team with a fresh id and no visual metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Create a team with an id supplied by the host.
    pub fn with_id(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visuals: serde_json::Value::Null,
        }
    }

    /// Attach opaque visual metadata.
    pub fn with_visuals(mut self, visuals: serde_json::Value) -> Self {
        self.visuals = visuals;
        self
    }
}
