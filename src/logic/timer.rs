//! Timer engine: remaining/elapsed time and phase-boundary detection.
//!
//! Elapsed time is measured from `started_at`, minus paused time, up to `paused_at`
//! (when paused) or `now`. Both [`remaining_time`] and [`advance`] classify a phase as
//! over once whole elapsed seconds reach its budget, so they never disagree.

use crate::models::{Millis, Phase, PhaseDurations, TimerState, TournamentError};

const SECOND: Millis = 1_000;
const MINUTE: Millis = 60 * SECOND;

/// Partial clock update produced by a phase transition. `None` fields are left as they are.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimerUpdate {
    pub current_phase: Phase,
    pub started_at: Option<Millis>,
    pub total_paused_time: Option<Millis>,
    pub warmup_remaining: Option<u64>,
    pub game_remaining: Option<u64>,
    pub flex_remaining: Option<u64>,
    pub overtime_minutes: Option<u64>,
}

impl TimerUpdate {
    fn new(current_phase: Phase) -> Self {
        Self {
            current_phase,
            ..Self::default()
        }
    }

    pub fn apply(&self, timers: &mut TimerState) {
        timers.current_phase = self.current_phase;
        if let Some(started_at) = self.started_at {
            timers.started_at = Some(started_at);
        }
        if let Some(paused) = self.total_paused_time {
            timers.total_paused_time = paused;
        }
        if let Some(secs) = self.warmup_remaining {
            timers.warmup_remaining = secs;
        }
        if let Some(secs) = self.game_remaining {
            timers.game_remaining = secs;
        }
        if let Some(secs) = self.flex_remaining {
            timers.flex_remaining = secs;
        }
        if let Some(minutes) = self.overtime_minutes {
            timers.overtime_minutes = Some(minutes);
        }
    }
}

/// Milliseconds counted in the current run, or `None` if the clock never started.
pub fn adjusted_elapsed_ms(timers: &TimerState, now: Millis) -> Option<Millis> {
    let started_at = timers.started_at?;
    let reference = timers.paused_at.unwrap_or(now);
    Some((reference - started_at - timers.total_paused_time).max(0))
}

fn whole_seconds(ms: Millis) -> u64 {
    u64::try_from(ms / SECOND).unwrap_or(0)
}

fn to_millis(secs: u64) -> Millis {
    Millis::try_from(secs)
        .unwrap_or(Millis::MAX / SECOND)
        .saturating_mul(SECOND)
}

/// Seconds left in the current phase, or seconds past the end of flex while in overtime.
///
/// Returns 0 for a clock that is idle or never started.
pub fn remaining_time(timers: &TimerState, durations: &PhaseDurations, now: Millis) -> u64 {
    if timers.current_phase == Phase::Idle {
        return 0;
    }
    let Some(elapsed_ms) = adjusted_elapsed_ms(timers, now) else {
        return 0;
    };
    let elapsed = whole_seconds(elapsed_ms);
    match timers.current_phase {
        Phase::Overtime => elapsed.saturating_sub(durations.flex_secs),
        phase => durations.budget(phase).saturating_sub(elapsed),
    }
}

/// Transition out of a budgeted phase. `overflow_ms` is the time already spent past its end.
fn enter_next(phase: Phase, durations: &PhaseDurations, now: Millis, overflow_ms: Millis) -> TimerUpdate {
    match phase {
        Phase::Warmup => TimerUpdate {
            started_at: Some(now - overflow_ms),
            total_paused_time: Some(0),
            warmup_remaining: Some(0),
            game_remaining: Some(durations.game_secs),
            ..TimerUpdate::new(Phase::Game)
        },
        Phase::Game => TimerUpdate {
            started_at: Some(now - overflow_ms),
            total_paused_time: Some(0),
            game_remaining: Some(0),
            flex_remaining: Some(durations.flex_secs),
            ..TimerUpdate::new(Phase::Flex)
        },
        // Overtime keeps counting from the start of flex.
        Phase::Flex => TimerUpdate {
            flex_remaining: Some(0),
            overtime_minutes: Some(u64::try_from(overflow_ms / MINUTE).unwrap_or(0)),
            ..TimerUpdate::new(Phase::Overtime)
        },
        Phase::Idle | Phase::Overtime => TimerUpdate::new(phase),
    }
}

/// Phase advance for one driver tick.
///
/// Returns `None` when nothing changed: the clock is idle, paused, never started, or
/// still inside its current phase. In overtime an update is returned only when the
/// whole-minute count changes. Re-running on the same snapshot yields the same answer.
pub fn advance(timers: &TimerState, durations: &PhaseDurations, now: Millis) -> Option<TimerUpdate> {
    if timers.is_paused() {
        return None;
    }
    let elapsed_ms = adjusted_elapsed_ms(timers, now)?;
    match timers.current_phase {
        Phase::Idle => None,
        Phase::Overtime => {
            let past_flex_ms = (elapsed_ms - to_millis(durations.flex_secs)).max(0);
            let minutes = u64::try_from(past_flex_ms / MINUTE).unwrap_or(0);
            (timers.overtime_minutes != Some(minutes)).then(|| TimerUpdate {
                overtime_minutes: Some(minutes),
                ..TimerUpdate::new(Phase::Overtime)
            })
        }
        phase => {
            let budget = durations.budget(phase);
            if whole_seconds(elapsed_ms) < budget {
                return None;
            }
            let overflow_ms = elapsed_ms - to_millis(budget);
            Some(enter_next(phase, durations, now, overflow_ms))
        }
    }
}

/// Forced transition to the next phase, starting it at `now`.
///
/// Not allowed from idle, in overtime, or during regulation when there is no flex time.
pub fn skip(timers: &TimerState, durations: &PhaseDurations, now: Millis) -> Result<TimerUpdate, TournamentError> {
    match timers.current_phase {
        phase @ (Phase::Idle | Phase::Overtime) => Err(TournamentError::SkipNotAllowed(phase)),
        Phase::Game if durations.flex_secs == 0 => Err(TournamentError::SkipNotAllowed(Phase::Game)),
        Phase::Flex => Ok(TimerUpdate {
            started_at: Some(now - to_millis(durations.flex_secs)),
            total_paused_time: Some(0),
            flex_remaining: Some(0),
            overtime_minutes: Some(0),
            ..TimerUpdate::new(Phase::Overtime)
        }),
        phase => Ok(enter_next(phase, durations, now, 0)),
    }
}

/// Start the warmup clock.
pub fn start(timers: &mut TimerState, durations: &PhaseDurations, now: Millis) {
    *timers = TimerState {
        current_phase: Phase::Warmup,
        started_at: Some(now),
        ..TimerState::new(durations)
    };
}

/// Freeze the clock at `now`, storing the current phase's remaining seconds.
pub fn pause(timers: &mut TimerState, durations: &PhaseDurations, now: Millis) {
    if timers.is_paused() {
        return;
    }
    let remaining = remaining_time(timers, durations, now);
    let phase = timers.current_phase;
    if let Some(field) = timers.remaining_field_mut(phase) {
        *field = remaining;
    }
    timers.paused_at = Some(now);
}

/// Continue a paused clock; the pause does not count as elapsed time.
pub fn resume(timers: &mut TimerState, now: Millis) {
    if let Some(paused_at) = timers.paused_at.take() {
        timers.total_paused_time += (now - paused_at).max(0);
    }
}
