//! Team data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in game slots and results).
pub type TeamId = Uuid;

/// A team entered in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Seed for bracket placement; unseeded teams are shuffled in after seeded ones.
    pub seed: Option<u32>,
}

impl Team {
    /// Create a new unseeded team with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed: None,
        }
    }

    /// Create a new team with a bracket seed.
    pub fn with_seed(name: impl Into<String>, seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(name)
        }
    }
}
