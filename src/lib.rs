//! Live multi-court tournament runner: library with models and business logic.

pub mod driver;
pub mod logic;
pub mod models;

pub use driver::TickDriver;
pub use logic::{
    adjusted_elapsed_ms, advance, assign_game, auto_assign, champion, clear_all_courts,
    current_round_number, eligible_games, evaluate, finish_game, format_clock, free_courts,
    generate_bracket, is_eligible, is_round_complete, is_tournament_complete, occupant,
    pause_game, pause_timer, remaining_time, remove_team, restart_game, resume_game,
    resume_timer, seed_order, set_referees, set_slot, skip_phase, skip_timer, start_game,
    start_timer, status_for_phase, tick_all, tick_game, unassign_game, Standing, TickReport,
    TimerUpdate,
};
pub use models::{
    AssignPriority, Bracket, BracketType, Court, CourtId, ErrorKind, Game, GameId, GameResult,
    GameSlot, GameStatus, Millis, OpenSlotPolicy, Phase, PhaseDurations, Position, RefereeId,
    Settings, Side, Team, TeamId, TimerState, Tournament, TournamentError, TournamentId,
    MAX_PHASE_MINUTES,
};
