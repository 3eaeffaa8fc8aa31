//! Tournament business logic: clocks, game lifecycle, courts and bracket progression.

mod clock;
mod courts;
mod generate;
mod lifecycle;
mod progression;
mod tick;
mod timer;

pub use clock::format_clock;
pub use courts::{
    assign_game, auto_assign, clear_all_courts, eligible_games, free_courts, is_eligible,
    occupant, unassign_game,
};
pub use generate::{generate_bracket, seed_order};
pub use lifecycle::{
    finish_game, pause_game, remove_team, restart_game, resume_game, set_referees, set_slot,
    skip_phase, start_game, status_for_phase, tick_game,
};
pub use progression::{
    champion, current_round_number, evaluate, is_round_complete, is_tournament_complete, Standing,
};
pub use tick::{tick_all, TickReport};
pub use timer::{
    adjusted_elapsed_ms, advance, pause as pause_timer, remaining_time, resume as resume_timer,
    skip as skip_timer, start as start_timer, TimerUpdate,
};
