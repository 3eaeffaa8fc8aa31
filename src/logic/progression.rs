//! Bracket progression: round completion, tournament standing, and moving results downstream.

use crate::models::{
    Bracket, Game, GameId, GameSlot, GameStatus, Position, Result, Side, TeamId, TournamentError,
};
use serde::Serialize;

/// Where the tournament stands. Computed from the bracket alone, in one place.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Standing {
    InProgress,
    /// The losers-bracket finalist won the grand final; the reset game decides the champion.
    AwaitingReset,
    /// `champion` is `None` only for degenerate brackets where nobody could be crowned.
    Complete { champion: Option<TeamId> },
}

/// Every game of winners round `round` (1-based) is finished with a result.
///
/// Double-BYE games count as decided since they are never played.
pub fn is_round_complete(bracket: &Bracket, round: usize) -> bool {
    round
        .checked_sub(1)
        .and_then(|r| bracket.winners.get(r))
        .is_some_and(|games| games.iter().all(|g| g.is_decided()))
}

/// 1-based number of the first winners round that is not complete, `None` once all are.
pub fn current_round_number(bracket: &Bracket) -> Option<usize> {
    (1..=bracket.winners.len()).find(|&round| !is_round_complete(bracket, round))
}

fn finished_winner(game: Option<&Game>) -> Option<TeamId> {
    game.filter(|g| g.status.is_finished())
        .and_then(|g| g.result.as_ref())
        .map(|r| r.winner_id)
}

/// Evaluate completion and champion together.
///
/// Priority: a finished reset decides; then a grand final won from the winners side;
/// then (single elimination) a complete last winners round; finally a bracket with no
/// playable game left is complete without a champion.
pub fn evaluate(bracket: &Bracket) -> Standing {
    if let Some(champion) = finished_winner(bracket.grand_final_reset.as_ref()) {
        return Standing::Complete {
            champion: Some(champion),
        };
    }
    if let Some(grand_final) = &bracket.grand_final {
        if let Some(winner) = finished_winner(Some(grand_final)) {
            if grand_final.team_a.team_id() == Some(winner) {
                return Standing::Complete {
                    champion: Some(winner),
                };
            }
            return Standing::AwaitingReset;
        }
    } else if !bracket.is_empty() && is_round_complete(bracket, bracket.winners.len()) {
        let champion = bracket
            .winners
            .last()
            .and_then(|games| games.last())
            .and_then(|g| finished_winner(Some(g)));
        return Standing::Complete { champion };
    }
    let remaining = bracket
        .games()
        .any(|g| !g.status.is_finished() && !g.is_double_bye());
    if remaining {
        Standing::InProgress
    } else {
        Standing::Complete { champion: None }
    }
}

pub fn is_tournament_complete(bracket: &Bracket) -> bool {
    matches!(evaluate(bracket), Standing::Complete { .. })
}

pub fn champion(bracket: &Bracket) -> Option<TeamId> {
    match evaluate(bracket) {
        Standing::Complete { champion } => champion,
        Standing::InProgress | Standing::AwaitingReset => None,
    }
}

/// Slot the winner of the game at `position` moves into.
fn winner_target(bracket: &Bracket, position: Position) -> Option<(Position, Side)> {
    match position {
        Position::Winners { round, index } => {
            if round + 1 < bracket.winners.len() {
                Some((
                    Position::Winners {
                        round: round + 1,
                        index: index / 2,
                    },
                    Side::for_index(index),
                ))
            } else {
                bracket
                    .grand_final
                    .as_ref()
                    .map(|_| (Position::GrandFinal, Side::A))
            }
        }
        Position::Losers { round, index } => {
            if round + 1 == bracket.losers_rounds() {
                Some((Position::GrandFinal, Side::B))
            } else if round % 2 == 0 {
                Some((
                    Position::Losers {
                        round: round + 1,
                        index,
                    },
                    Side::A,
                ))
            } else {
                Some((
                    Position::Losers {
                        round: round + 1,
                        index: index / 2,
                    },
                    Side::for_index(index),
                ))
            }
        }
        Position::GrandFinal | Position::GrandFinalReset => None,
    }
}

/// Slot the loser of a winners-bracket game drops into (double elimination only).
fn loser_target(bracket: &Bracket, position: Position) -> Option<(Position, Side)> {
    if !bracket.is_double_elimination() {
        return None;
    }
    let Position::Winners { round, index } = position else {
        return None;
    };
    if bracket.losers_rounds() == 0 {
        return Some((Position::GrandFinal, Side::B));
    }
    if round == 0 {
        Some((
            Position::Losers {
                round: 0,
                index: index / 2,
            },
            Side::for_index(index),
        ))
    } else {
        Some((
            Position::Losers {
                round: 2 * round - 1,
                index,
            },
            Side::B,
        ))
    }
}

/// Fill an open slot of a game that has not started. Returns whether anything changed.
fn place(bracket: &mut Bracket, target: (Position, Side), slot: GameSlot) -> bool {
    let (position, side) = target;
    let Some(game) = bracket.game_at_mut(position) else {
        return false;
    };
    let current = *game.slot(side);
    if current == slot {
        return false;
    }
    if game.status != GameStatus::Queued || !current.is_open() {
        log::warn!(
            "Not placing into side {:?} of game {}: it is {:?} with {:?}",
            side,
            game.id,
            game.status,
            current
        );
        return false;
    }
    *game.slot_mut(side) = slot;
    log::debug!("Placed {:?} into side {:?} of game {}", slot, side, game.id);
    true
}

/// Move a finished game's winner (and loser, for double elimination) downstream.
///
/// A grand final won by the losers-bracket side populates the reset game.
pub(crate) fn propagate_result(bracket: &mut Bracket, game_id: GameId) {
    let Some(position) = bracket.position(game_id) else {
        return;
    };
    let Some(game) = bracket.game_at(position) else {
        return;
    };
    let (Some(result), Some(loser)) = (game.result.as_ref(), game.loser_slot()) else {
        return;
    };
    let winner = GameSlot::team(result.winner_id);
    let winner_side = game.winner_side();
    let finalists = (game.team_a, game.team_b);

    if position == Position::GrandFinal {
        if winner_side == Some(Side::B) {
            if let Some(reset) = bracket
                .grand_final_reset
                .as_mut()
                .filter(|g| g.status == GameStatus::Queued)
            {
                reset.team_a = finalists.0;
                reset.team_b = finalists.1;
                log::info!("Grand final won from the losers bracket; reset game {} is on", reset.id);
            }
        }
        return;
    }
    if let Some(target) = winner_target(bracket, position) {
        place(bracket, target, winner);
    }
    if let Some(target) = loser_target(bracket, position) {
        place(bracket, target, loser);
    }
    settle_byes(bracket);
}

/// Whether the slot at `target` still holds `slot`.
fn holds(bracket: &Bracket, target: (Position, Side), slot: GameSlot) -> bool {
    let (position, side) = target;
    bracket
        .game_at(position)
        .is_some_and(|g| *g.slot(side) == slot)
}

/// Undo [`propagate_result`] before a finished game is restarted.
///
/// Only slots still holding what this game propagated are reopened, so a slot an
/// operator filled by hand keeps its value. Fails if one of those games has already
/// left `Queued`.
pub(crate) fn retract_result(bracket: &mut Bracket, game_id: GameId) -> Result<()> {
    let position = bracket
        .position(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    let Some(game) = bracket.game_at(position) else {
        return Ok(());
    };
    let Some(result) = game.result.as_ref() else {
        return Ok(());
    };
    let winner = GameSlot::team(result.winner_id);
    let loser = game.loser_slot();
    let finalists = (game.team_a, game.team_b);

    let mut targets: Vec<(Position, Side)> = Vec::new();
    if position == Position::GrandFinal {
        let reset_holds_finalists = bracket
            .grand_final_reset
            .as_ref()
            .is_some_and(|g| (g.team_a, g.team_b) == finalists);
        if reset_holds_finalists {
            targets.push((Position::GrandFinalReset, Side::A));
            targets.push((Position::GrandFinalReset, Side::B));
        }
    } else {
        targets.extend(winner_target(bracket, position).filter(|&t| holds(bracket, t, winner)));
        if let Some(loser) = loser {
            targets.extend(loser_target(bracket, position).filter(|&t| holds(bracket, t, loser)));
        }
    }

    for &(target, _) in &targets {
        if let Some(game) = bracket.game_at(target) {
            if game.status != GameStatus::Queued {
                return Err(TournamentError::DownstreamStarted(game.id));
            }
        }
    }
    for (target, side) in targets {
        if let Some(game) = bracket.game_at_mut(target) {
            *game.slot_mut(side) = GameSlot::Open;
            log::debug!("Reopened side {:?} of game {}", side, game.id);
        }
    }
    Ok(())
}

/// Push BYEs through queued double-BYE games until nothing changes. Returns slots filled.
pub(crate) fn settle_byes(bracket: &mut Bracket) -> usize {
    let mut filled = 0;
    loop {
        let double_byes: Vec<Position> = bracket
            .games()
            .filter(|g| g.status == GameStatus::Queued && g.is_double_bye())
            .filter_map(|g| bracket.position(g.id))
            .collect();
        let mut changed = 0;
        for position in double_byes {
            let targets: Vec<_> = winner_target(bracket, position)
                .into_iter()
                .chain(loser_target(bracket, position))
                .collect();
            for target in targets {
                if place(bracket, target, GameSlot::Bye) {
                    changed += 1;
                }
            }
        }
        if changed == 0 {
            return filled;
        }
        filled += changed;
    }
}
