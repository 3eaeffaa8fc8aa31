//! Court assignment: eligibility, manual assign/unassign, clearing and auto-assign.
//!
//! A court is held by at most one game that is not finished. Every check-then-set
//! happens under the caller's `&mut Tournament`, so two games can never land on one court.

use crate::logic::progression::current_round_number;
use crate::models::{
    AssignPriority, BracketType, CourtId, Game, GameId, GameStatus, Result, Tournament,
    TournamentError,
};

/// The game (not finished) currently holding a court.
pub fn occupant(tournament: &Tournament, court_id: CourtId) -> Option<&Game> {
    tournament
        .games()
        .find(|g| g.court_id == Some(court_id) && !g.status.is_finished())
}

/// Courts with no game on them, in court order.
pub fn free_courts(tournament: &Tournament) -> Vec<CourtId> {
    tournament
        .courts
        .iter()
        .map(|c| c.id)
        .filter(|&id| occupant(tournament, id).is_none())
        .collect()
}

fn is_eligible_in_round(tournament: &Tournament, game: &Game, current_round: Option<usize>) -> bool {
    if game.court_id.is_some() || game.status != GameStatus::Queued {
        return false;
    }
    if game.has_open_slot() {
        return false;
    }
    if game.is_double_bye() {
        // Only a bracket whose single first-round game is a double BYE may surface it.
        return game.bracket_type == BracketType::Winners
            && game.round == 1
            && tournament.bracket.winners.first().map_or(0, Vec::len) == 1;
    }
    match game.bracket_type {
        BracketType::Winners => current_round == Some(game.round),
        BracketType::Losers | BracketType::Final => game.has_real_team(),
    }
}

/// Whether a game may be put on a court now.
pub fn is_eligible(tournament: &Tournament, game: &Game) -> bool {
    is_eligible_in_round(tournament, game, current_round_number(&tournament.bracket))
}

fn priority_key(priority: AssignPriority, game: &Game) -> (usize, usize) {
    let bracket_rank = |order: [BracketType; 3]| {
        order
            .iter()
            .position(|&b| b == game.bracket_type)
            .unwrap_or(order.len())
    };
    match priority {
        AssignPriority::WinnersFirst => (
            bracket_rank([BracketType::Winners, BracketType::Losers, BracketType::Final]),
            0,
        ),
        AssignPriority::LosersFirst => (
            bracket_rank([BracketType::Losers, BracketType::Winners, BracketType::Final]),
            0,
        ),
        AssignPriority::LowestRoundFirst => (
            game.round,
            bracket_rank([BracketType::Winners, BracketType::Losers, BracketType::Final]),
        ),
    }
}

/// Eligible games, in bracket order refined by the configured priority.
pub fn eligible_games(tournament: &Tournament) -> Vec<GameId> {
    let current_round = current_round_number(&tournament.bracket);
    let mut games: Vec<&Game> = tournament
        .games()
        .filter(|g| is_eligible_in_round(tournament, g, current_round))
        .collect();
    let priority = tournament.settings.assign_priority;
    games.sort_by_key(|g| priority_key(priority, g));
    games.into_iter().map(|g| g.id).collect()
}

/// Put a queued game on a free court.
pub fn assign_game(tournament: &mut Tournament, game_id: GameId, court_id: CourtId) -> Result<()> {
    if tournament.court(court_id).is_none() {
        return Err(TournamentError::CourtNotFound(court_id));
    }
    let game = tournament
        .game(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status != GameStatus::Queued {
        return Err(TournamentError::InvalidStatus {
            action: "assign",
            status: game.status,
        });
    }
    if game.has_open_slot() {
        return Err(TournamentError::OpenSlot(game_id));
    }
    if game.is_double_bye() {
        return Err(TournamentError::DoubleBye(game_id));
    }
    if let Some(holder) = occupant(tournament, court_id) {
        if holder.id != game_id {
            return Err(TournamentError::CourtOccupied {
                court_id,
                game_id: holder.id,
            });
        }
    }
    if let Some(game) = tournament.game_mut(game_id) {
        game.court_id = Some(court_id);
    }
    log::info!("Game {} assigned to court {}", game_id, court_id);
    Ok(())
}

/// Take a queued game off its court. Games in progress must be finished first.
pub fn unassign_game(tournament: &mut Tournament, game_id: GameId) -> Result<()> {
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status != GameStatus::Queued {
        return Err(TournamentError::InvalidStatus {
            action: "unassign",
            status: game.status,
        });
    }
    if let Some(court_id) = game.court_id.take() {
        log::info!("Game {} taken off court {}", game_id, court_id);
    }
    Ok(())
}

/// Take every queued game off its court. Returns how many games in progress stay on one.
pub fn clear_all_courts(tournament: &mut Tournament) -> usize {
    let mut cleared = 0;
    let mut kept = 0;
    for game in tournament.bracket.games_mut() {
        if game.court_id.is_none() || game.status.is_finished() {
            continue;
        }
        if game.status == GameStatus::Queued {
            game.court_id = None;
            cleared += 1;
        } else {
            kept += 1;
        }
    }
    log::info!("Cleared {} court assignment(s), {} game(s) in progress kept", cleared, kept);
    kept
}

/// Fill every free court with the next eligible game. Occupied courts are left alone.
///
/// A surfaced double-BYE game is never put on a court since it cannot be started.
pub fn auto_assign(tournament: &mut Tournament) -> Vec<(GameId, CourtId)> {
    let playable: Vec<GameId> = eligible_games(tournament)
        .into_iter()
        .filter(|&id| tournament.game(id).is_some_and(|g| !g.is_double_bye()))
        .collect();
    let assignments: Vec<(GameId, CourtId)> = playable
        .into_iter()
        .zip(free_courts(tournament))
        .collect();
    for &(game_id, court_id) in &assignments {
        if let Some(game) = tournament.game_mut(game_id) {
            game.court_id = Some(court_id);
        }
        log::info!("Auto-assigned game {} to court {}", game_id, court_id);
    }
    assignments
}
