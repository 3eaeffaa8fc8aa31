//! Tournament settings consumed by the clock and game lifecycle.

use crate::models::timer::{PhaseDurations, TimerState};
use crate::models::tournament::{Result, TournamentError};
use serde::{Deserialize, Serialize};

/// Longest allowed warmup, game or flex phase.
pub const MAX_PHASE_MINUTES: u64 = 24 * 60;

/// What starting a game does with an `Open` slot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenSlotPolicy {
    /// An operator must resolve the slot first.
    #[default]
    Open,
    /// The slot is treated as a BYE when the game starts.
    Bye,
}

/// Bracket preference used by auto-assign when several games are eligible.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignPriority {
    /// Winners rounds, then losers rounds, then finals.
    #[default]
    WinnersFirst,
    /// Losers rounds, then winners rounds, then finals.
    LosersFirst,
    /// Lowest round number across brackets; winners before losers on ties.
    LowestRoundFirst,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub warmup_minutes: u64,
    pub game_length_minutes: u64,
    pub flex_minutes: u64,
    pub referees_per_game: Option<usize>,
    pub open_slot_policy: OpenSlotPolicy,
    /// Finishing a game requires distinct scores with the winner ahead.
    pub scoring_required: bool,
    pub include_losers_bracket: bool,
    pub assign_priority: AssignPriority,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warmup_minutes: 5,
            game_length_minutes: 20,
            flex_minutes: 5,
            referees_per_game: None,
            open_slot_policy: OpenSlotPolicy::Open,
            scoring_required: false,
            include_losers_bracket: false,
            assign_priority: AssignPriority::WinnersFirst,
        }
    }
}

impl Settings {
    /// Reject phase lengths above [`MAX_PHASE_MINUTES`].
    pub fn validate(&self) -> Result<()> {
        let longest = self
            .warmup_minutes
            .max(self.game_length_minutes)
            .max(self.flex_minutes);
        if longest > MAX_PHASE_MINUTES {
            return Err(TournamentError::PhaseTooLong {
                max: MAX_PHASE_MINUTES,
                given: longest,
            });
        }
        Ok(())
    }

    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations::new(
            self.warmup_minutes.saturating_mul(60),
            self.game_length_minutes.saturating_mul(60),
            self.flex_minutes.saturating_mul(60),
        )
    }

    /// Clock state for a game that has not started yet.
    pub fn initial_timers(&self) -> TimerState {
        TimerState::new(&self.durations())
    }
}
