//! Game, its two slots, status and result.

use crate::models::court::CourtId;
use crate::models::team::TeamId;
use crate::models::timer::TimerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game.
pub type GameId = Uuid;

/// Unique identifier for a referee (the referee pool itself lives outside the core).
pub type RefereeId = Uuid;

/// Which side of a game a slot is on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Side fed by the upstream game at `index` (even indices feed A, odd feed B).
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }
}

/// One side of a game.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameSlot {
    Team {
        team_id: TeamId,
    },
    /// Walkover: the other side advances without play.
    Bye,
    /// Not yet determined; must be filled before the game can start.
    #[default]
    Open,
}

impl GameSlot {
    pub fn team(team_id: TeamId) -> Self {
        GameSlot::Team { team_id }
    }

    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            GameSlot::Team { team_id } => Some(*team_id),
            GameSlot::Bye | GameSlot::Open => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, GameSlot::Bye)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, GameSlot::Open)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Queued,
    Warmup,
    Live,
    Flex,
    Paused,
    Finished,
}

impl GameStatus {
    /// Clock is running (warmup, regulation or flex/overtime).
    pub fn is_running(self) -> bool {
        matches!(self, GameStatus::Warmup | GameStatus::Live | GameStatus::Flex)
    }

    pub fn is_finished(self) -> bool {
        self == GameStatus::Finished
    }
}

/// Which part of the bracket a game belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum BracketType {
    #[serde(rename = "W")]
    Winners,
    #[serde(rename = "L")]
    Losers,
    #[serde(rename = "Final")]
    Final,
}

/// Outcome of a finished game. Team names are captured at finish time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner_id: TeamId,
    pub score_a: u32,
    pub score_b: u32,
    pub team_a_name: Option<String>,
    pub team_b_name: Option<String>,
    pub finished_at: DateTime<Utc>,
}

/// A single game between two slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub team_a: GameSlot,
    pub team_b: GameSlot,
    pub status: GameStatus,
    pub timers: TimerState,
    /// Present iff `status` is `Finished`.
    pub result: Option<GameResult>,
    /// 1-based round within its bracket.
    pub round: usize,
    pub bracket_type: BracketType,
    /// Court currently held by this game; cleared on finish.
    pub court_id: Option<CourtId>,
    pub ref_ids: Vec<RefereeId>,
}

impl Game {
    pub fn new(
        team_a: GameSlot,
        team_b: GameSlot,
        round: usize,
        bracket_type: BracketType,
        timers: TimerState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_a,
            team_b,
            status: GameStatus::Queued,
            timers,
            result: None,
            round,
            bracket_type,
            court_id: None,
            ref_ids: Vec::new(),
        }
    }

    pub fn slot(&self, side: Side) -> &GameSlot {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut GameSlot {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    /// Side the given team plays on, if any.
    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        if self.team_a.team_id() == Some(team_id) {
            Some(Side::A)
        } else if self.team_b.team_id() == Some(team_id) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn has_open_slot(&self) -> bool {
        self.team_a.is_open() || self.team_b.is_open()
    }

    pub fn is_double_bye(&self) -> bool {
        self.team_a.is_bye() && self.team_b.is_bye()
    }

    pub fn has_real_team(&self) -> bool {
        self.team_a.team_id().is_some() || self.team_b.team_id().is_some()
    }

    /// The team that advances by walkover: exactly one side is a BYE and the other a team.
    pub fn bye_winner(&self) -> Option<TeamId> {
        match (&self.team_a, &self.team_b) {
            (GameSlot::Team { team_id }, GameSlot::Bye)
            | (GameSlot::Bye, GameSlot::Team { team_id }) => Some(*team_id),
            _ => None,
        }
    }

    /// Side of the recorded winner, once finished.
    pub fn winner_side(&self) -> Option<Side> {
        self.result.as_ref().and_then(|r| self.side_of(r.winner_id))
    }

    /// Slot the loser occupied, once finished (a BYE loser stays a BYE).
    pub fn loser_slot(&self) -> Option<GameSlot> {
        self.winner_side().map(|side| *self.slot(side.other()))
    }

    /// Finished with a result, or a double-BYE that resolves without being played.
    pub fn is_decided(&self) -> bool {
        (self.status.is_finished() && self.result.is_some()) || self.is_double_bye()
    }
}
