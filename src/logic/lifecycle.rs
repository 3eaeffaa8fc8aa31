//! Game lifecycle: start, pause, resume, skip, finish and restart, plus the
//! slot, referee and team-removal operations that feed into it.

use crate::logic::progression::{propagate_result, retract_result, settle_byes};
use crate::logic::timer;
use crate::models::{
    GameId, GameResult, GameSlot, GameStatus, Millis, OpenSlotPolicy, Phase, RefereeId, Result,
    Side, TeamId, Tournament, TournamentError,
};
use chrono::{DateTime, Utc};

/// Status implied by a clock phase.
pub fn status_for_phase(phase: Phase) -> GameStatus {
    match phase {
        Phase::Idle => GameStatus::Queued,
        Phase::Warmup => GameStatus::Warmup,
        Phase::Game => GameStatus::Live,
        Phase::Flex | Phase::Overtime => GameStatus::Flex,
    }
}

fn invalid(action: &'static str, status: GameStatus) -> TournamentError {
    TournamentError::InvalidStatus { action, status }
}

/// Start a queued game.
///
/// A game with exactly one BYE is finished on the spot as a walkover. Open slots are
/// refused or turned into BYEs depending on the open-slot policy. Returns the new status.
pub fn start_game(tournament: &mut Tournament, game_id: GameId, now: Millis) -> Result<GameStatus> {
    let policy = tournament.settings.open_slot_policy;
    let durations = tournament.settings.durations();
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status != GameStatus::Queued {
        return Err(invalid("start", game.status));
    }
    if game.has_open_slot() && policy == OpenSlotPolicy::Open {
        return Err(TournamentError::OpenSlot(game_id));
    }
    // Slots as the policy resolves them; the game is untouched until they are accepted.
    let resolve = |slot: GameSlot| if slot.is_open() { GameSlot::Bye } else { slot };
    let (team_a, team_b) = (resolve(game.team_a), resolve(game.team_b));
    if team_a.is_bye() && team_b.is_bye() {
        return Err(TournamentError::DoubleBye(game_id));
    }
    game.team_a = team_a;
    game.team_b = team_b;
    if let Some(winner) = game.bye_winner() {
        walkover(tournament, game_id, winner, now);
        return Ok(GameStatus::Finished);
    }
    timer::start(&mut game.timers, &durations, now);
    game.status = GameStatus::Warmup;
    log::info!("Game {} started (round {}, {:?})", game_id, game.round, game.bracket_type);
    Ok(GameStatus::Warmup)
}

/// Pause a running game. Pausing a finished game does nothing.
pub fn pause_game(tournament: &mut Tournament, game_id: GameId, now: Millis) -> Result<()> {
    let durations = tournament.settings.durations();
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    match game.status {
        GameStatus::Finished => Ok(()),
        status if status.is_running() => {
            timer::pause(&mut game.timers, &durations, now);
            game.status = GameStatus::Paused;
            log::info!("Game {} paused during {:?}", game_id, game.timers.current_phase);
            Ok(())
        }
        status => Err(invalid("pause", status)),
    }
}

/// Resume a paused game into the status its clock phase implies.
pub fn resume_game(tournament: &mut Tournament, game_id: GameId, now: Millis) -> Result<GameStatus> {
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status != GameStatus::Paused {
        return Err(invalid("resume", game.status));
    }
    timer::resume(&mut game.timers, now);
    game.status = status_for_phase(game.timers.current_phase);
    log::info!("Game {} resumed as {:?}", game_id, game.status);
    Ok(game.status)
}

/// Jump a running game to its next phase now.
pub fn skip_phase(tournament: &mut Tournament, game_id: GameId, now: Millis) -> Result<Phase> {
    let durations = tournament.settings.durations();
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if !game.status.is_running() {
        return Err(invalid("skip", game.status));
    }
    let update = timer::skip(&game.timers, &durations, now)?;
    update.apply(&mut game.timers);
    game.status = status_for_phase(update.current_phase);
    log::info!("Game {} skipped ahead to {:?}", game_id, update.current_phase);
    Ok(update.current_phase)
}

/// Apply one driver tick to a running game. Returns the new phase if it changed.
pub fn tick_game(tournament: &mut Tournament, game_id: GameId, now: Millis) -> Result<Option<Phase>> {
    let durations = tournament.settings.durations();
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if !game.status.is_running() {
        return Err(invalid("tick", game.status));
    }
    let Some(update) = timer::advance(&game.timers, &durations, now) else {
        return Ok(None);
    };
    let before = game.timers.current_phase;
    update.apply(&mut game.timers);
    game.status = status_for_phase(update.current_phase);
    if before == update.current_phase {
        return Ok(None);
    }
    log::info!("Game {} moved from {:?} to {:?}", game_id, before, update.current_phase);
    Ok(Some(update.current_phase))
}

fn finished_at(now: Millis) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(now).unwrap_or_default()
}

/// Record a result, free the court and move the result downstream.
fn record_result(
    tournament: &mut Tournament,
    game_id: GameId,
    winner_id: TeamId,
    score_a: u32,
    score_b: u32,
    now: Millis,
) {
    let names = tournament.game(game_id).map(|g| {
        (
            g.team_a.team_id().and_then(|id| tournament.team_name(id)),
            g.team_b.team_id().and_then(|id| tournament.team_name(id)),
        )
    });
    let Some((team_a_name, team_b_name)) = names else {
        return;
    };
    let Some(game) = tournament.game_mut(game_id) else {
        return;
    };
    game.result = Some(GameResult {
        winner_id,
        score_a,
        score_b,
        team_a_name,
        team_b_name,
        finished_at: finished_at(now),
    });
    game.status = GameStatus::Finished;
    game.timers.paused_at = None;
    game.court_id = None;
    log::info!("Game {} finished {}-{}, winner {}", game_id, score_a, score_b, winner_id);
    propagate_result(&mut tournament.bracket, game_id);
}

/// Finish a BYE game: the team scores 1, the BYE 0.
fn walkover(tournament: &mut Tournament, game_id: GameId, winner_id: TeamId, now: Millis) {
    let side = tournament.game(game_id).and_then(|g| g.side_of(winner_id));
    let (score_a, score_b) = match side {
        Some(Side::B) => (0, 1),
        _ => (1, 0),
    };
    log::info!("Game {} is a walkover for {}", game_id, winner_id);
    record_result(tournament, game_id, winner_id, score_a, score_b, now);
}

/// Finish a game with the operator's result.
pub fn finish_game(
    tournament: &mut Tournament,
    game_id: GameId,
    winner_id: TeamId,
    score_a: u32,
    score_b: u32,
    now: Millis,
) -> Result<()> {
    let scoring_required = tournament.settings.scoring_required;
    let game = tournament
        .game(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status.is_finished() {
        return Err(invalid("finish", game.status));
    }
    let side = game
        .side_of(winner_id)
        .ok_or(TournamentError::WinnerNotInGame(winner_id))?;
    if scoring_required {
        if score_a == score_b {
            return Err(TournamentError::TiedScore);
        }
        let winner_ahead = match side {
            Side::A => score_a > score_b,
            Side::B => score_b > score_a,
        };
        if !winner_ahead {
            return Err(TournamentError::WinnerScoreMismatch);
        }
    }
    record_result(tournament, game_id, winner_id, score_a, score_b, now);
    Ok(())
}

/// Put a game back to `Queued` with a fresh clock.
///
/// A finished game has its result withdrawn from downstream games first; this fails
/// if any of them has already started.
pub fn restart_game(tournament: &mut Tournament, game_id: GameId) -> Result<()> {
    let timers = tournament.settings.initial_timers();
    let status = tournament
        .game(game_id)
        .map(|g| g.status)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if status.is_finished() {
        retract_result(&mut tournament.bracket, game_id)?;
    }
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    game.timers = timers;
    game.status = GameStatus::Queued;
    game.result = None;
    log::info!("Game {} restarted from {:?}", game_id, status);
    Ok(())
}

/// Resolve an open slot of a queued game to a team or a BYE.
pub fn set_slot(tournament: &mut Tournament, game_id: GameId, side: Side, slot: GameSlot) -> Result<()> {
    match slot {
        GameSlot::Open => return Err(TournamentError::InvalidSlotValue),
        GameSlot::Team { team_id } if tournament.team(team_id).is_none() => {
            return Err(TournamentError::TeamNotFound(team_id));
        }
        _ => {}
    }
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status != GameStatus::Queued {
        return Err(invalid("edit", game.status));
    }
    if !game.slot(side).is_open() {
        return Err(TournamentError::SlotAlreadyFilled(game_id));
    }
    *game.slot_mut(side) = slot;
    log::info!("Game {} side {:?} resolved to {:?}", game_id, side, slot);
    settle_byes(&mut tournament.bracket);
    Ok(())
}

/// Assign referees to a game, bounded by the configured referees per game.
pub fn set_referees(tournament: &mut Tournament, game_id: GameId, ref_ids: Vec<RefereeId>) -> Result<()> {
    if let Some(max) = tournament.settings.referees_per_game {
        if ref_ids.len() > max {
            return Err(TournamentError::TooManyReferees {
                max,
                given: ref_ids.len(),
            });
        }
    }
    let game = tournament
        .game_mut(game_id)
        .ok_or(TournamentError::GameNotFound(game_id))?;
    if game.status.is_finished() {
        return Err(invalid("referee", game.status));
    }
    game.ref_ids = ref_ids;
    Ok(())
}

/// Remove a team. Every unfinished game it plays in gets a BYE on that side, and those
/// with an opponent still present are finished as walkovers. Returns how many were.
pub fn remove_team(tournament: &mut Tournament, team_id: TeamId, now: Millis) -> Result<usize> {
    let idx = tournament
        .teams
        .iter()
        .position(|t| t.id == team_id)
        .ok_or(TournamentError::TeamNotFound(team_id))?;
    let timers = tournament.settings.initial_timers();

    let affected: Vec<GameId> = tournament
        .games()
        .filter(|g| !g.status.is_finished() && g.side_of(team_id).is_some())
        .map(|g| g.id)
        .collect();
    let mut walkovers = 0;
    for game_id in affected {
        let Some(game) = tournament.game_mut(game_id) else {
            continue;
        };
        while let Some(side) = game.side_of(team_id) {
            *game.slot_mut(side) = GameSlot::Bye;
        }
        if let Some(winner) = game.bye_winner() {
            walkover(tournament, game_id, winner, now);
            walkovers += 1;
        } else if game.is_double_bye() {
            game.court_id = None;
            game.timers = timers.clone();
            game.status = GameStatus::Queued;
        }
    }
    tournament.teams.remove(idx);
    settle_byes(&mut tournament.bracket);
    log::info!("Removed team {} ({} walkover(s))", team_id, walkovers);
    Ok(walkovers)
}
