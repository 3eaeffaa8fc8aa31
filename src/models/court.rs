//! Physical courts that games are played on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a court.
pub type CourtId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
