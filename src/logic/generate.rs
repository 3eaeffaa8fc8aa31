//! Bracket generation from the team list: single or double elimination.

use crate::logic::progression::settle_byes;
use crate::models::{
    Bracket, BracketType, Game, GameSlot, Result, Team, TimerState, Tournament, TournamentError,
};
use rand::seq::SliceRandom;

/// Seed numbers (1-based) in bracket position order, so 1 meets N, 2 meets N-1, etc.
pub fn seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, n - s]).collect();
    }
    order
}

/// Seeded teams by seed, then unseeded teams in random order.
fn seeding(teams: &[Team]) -> Vec<&Team> {
    let (mut seeded, mut unseeded): (Vec<&Team>, Vec<&Team>) =
        teams.iter().partition(|t| t.seed.is_some());
    seeded.sort_by_key(|t| t.seed);
    unseeded.shuffle(&mut rand::thread_rng());
    seeded.append(&mut unseeded);
    seeded
}

fn open_round(games: usize, round: usize, bracket_type: BracketType, timers: &TimerState) -> Vec<Game> {
    (0..games)
        .map(|_| Game::new(GameSlot::Open, GameSlot::Open, round, bracket_type, timers.clone()))
        .collect()
}

/// Build the bracket for the tournament's teams, replacing any previous one.
///
/// Only allowed before any game has started. Positions without a team become BYEs.
pub fn generate_bracket(tournament: &mut Tournament) -> Result<()> {
    if tournament.has_started() {
        return Err(TournamentError::TournamentStarted);
    }
    if tournament.teams.len() < 2 {
        return Err(TournamentError::NotEnoughTeams);
    }
    let timers = tournament.settings.initial_timers();
    let seeded = seeding(&tournament.teams);
    let size = seeded.len().next_power_of_two();
    let rounds = size.trailing_zeros() as usize;

    let slot_for = |seed: usize| {
        seeded
            .get(seed - 1)
            .map_or(GameSlot::Bye, |t| GameSlot::team(t.id))
    };
    let first_round: Vec<Game> = seed_order(size)
        .chunks_exact(2)
        .map(|pair| {
            Game::new(
                slot_for(pair[0]),
                slot_for(pair[1]),
                1,
                BracketType::Winners,
                timers.clone(),
            )
        })
        .collect();

    let mut winners = vec![first_round];
    for round in 1..rounds {
        winners.push(open_round(size >> (round + 1), round + 1, BracketType::Winners, &timers));
    }

    let mut bracket = Bracket {
        winners,
        ..Bracket::default()
    };
    if tournament.settings.include_losers_bracket {
        let losers = (0..2 * (rounds - 1))
            .map(|round| open_round(size >> (round / 2 + 2), round + 1, BracketType::Losers, &timers))
            .collect();
        bracket.losers = Some(losers);
        bracket.grand_final = Some(Game::new(GameSlot::Open, GameSlot::Open, 1, BracketType::Final, timers.clone()));
        bracket.grand_final_reset = Some(Game::new(GameSlot::Open, GameSlot::Open, 2, BracketType::Final, timers));
    }
    settle_byes(&mut bracket);

    log::info!(
        "Generated {} bracket for {} teams ({} winners rounds, {} losers rounds)",
        if bracket.is_double_elimination() { "double elimination" } else { "single elimination" },
        tournament.teams.len(),
        bracket.winners.len(),
        bracket.losers_rounds()
    );
    tournament.bracket = bracket;
    Ok(())
}
