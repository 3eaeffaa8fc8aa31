//! Persisted per-game clock state and the phase budgets it is measured against.

use serde::{Deserialize, Serialize};

/// Wall-clock instant in milliseconds since the Unix epoch.
pub type Millis = i64;

/// Clock phase of a game. `Overtime` counts up without a budget.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Warmup,
    Game,
    Flex,
    Overtime,
}

/// Configured length of each budgeted phase, in seconds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub warmup_secs: u64,
    pub game_secs: u64,
    pub flex_secs: u64,
}

impl PhaseDurations {
    pub fn new(warmup_secs: u64, game_secs: u64, flex_secs: u64) -> Self {
        Self {
            warmup_secs,
            game_secs,
            flex_secs,
        }
    }

    /// Full budget of a phase. `Idle` and `Overtime` have none.
    pub fn budget(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Warmup => self.warmup_secs,
            Phase::Game => self.game_secs,
            Phase::Flex => self.flex_secs,
            Phase::Idle | Phase::Overtime => 0,
        }
    }
}

/// Clock state stored on every game.
///
/// `started_at` is the start of the current run and is re-based on each phase
/// transition (except the entry into overtime). `paused_at` is set iff the game is
/// paused; `total_paused_time` holds earlier pauses of the current run in milliseconds.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub warmup_remaining: u64,
    pub game_remaining: u64,
    pub flex_remaining: u64,
    pub current_phase: Phase,
    pub started_at: Option<Millis>,
    pub paused_at: Option<Millis>,
    pub total_paused_time: Millis,
    pub overtime_minutes: Option<u64>,
}

impl TimerState {
    /// Initial (never started) clock for the given budgets.
    pub fn new(durations: &PhaseDurations) -> Self {
        Self {
            warmup_remaining: durations.warmup_secs,
            game_remaining: durations.game_secs,
            flex_remaining: durations.flex_secs,
            ..Self::default()
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Mutable reference to the stored remaining seconds of a budgeted phase.
    pub fn remaining_field_mut(&mut self, phase: Phase) -> Option<&mut u64> {
        match phase {
            Phase::Warmup => Some(&mut self.warmup_remaining),
            Phase::Game => Some(&mut self.game_remaining),
            Phase::Flex => Some(&mut self.flex_remaining),
            Phase::Idle | Phase::Overtime => None,
        }
    }
}
