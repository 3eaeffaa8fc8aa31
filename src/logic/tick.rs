//! One polling-driver tick over every running game of a tournament.

use crate::logic::lifecycle::tick_game;
use crate::models::{GameId, Millis, Tournament};
use serde::Serialize;

/// What a tick did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TickReport {
    pub ticked: usize,
    pub transitions: usize,
    pub failures: usize,
}

/// Advance the clock of every running game. A failure for one game is logged and
/// counted; the remaining games are still processed.
pub fn tick_all(tournament: &mut Tournament, now: Millis) -> TickReport {
    let running: Vec<GameId> = tournament
        .games()
        .filter(|g| g.status.is_running())
        .map(|g| g.id)
        .collect();
    let mut report = TickReport::default();
    for game_id in running {
        report.ticked += 1;
        match tick_game(tournament, game_id, now) {
            Ok(Some(_)) => report.transitions += 1,
            Ok(None) => {}
            Err(e) => {
                log::warn!("Tick skipped for game {}: {}", game_id, e);
                report.failures += 1;
            }
        }
    }
    report
}
