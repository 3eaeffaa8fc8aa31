//! Bracket: winners rounds, optional losers rounds, grand final and reset.

use crate::models::game::{Game, GameId};
use serde::{Deserialize, Serialize};

/// Location of a game inside the bracket (0-based rounds and indices).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Position {
    Winners { round: usize, index: usize },
    Losers { round: usize, index: usize },
    GrandFinal,
    GrandFinalReset,
}

/// All games of a tournament. `winners[r][i]` feeds `winners[r + 1][i / 2]`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub winners: Vec<Vec<Game>>,
    /// Present only for double elimination.
    pub losers: Option<Vec<Vec<Game>>>,
    pub grand_final: Option<Game>,
    /// Played only if the losers-bracket finalist wins the grand final.
    pub grand_final_reset: Option<Game>,
}

impl Bracket {
    pub fn is_empty(&self) -> bool {
        self.winners.iter().all(Vec::is_empty)
    }

    pub fn is_double_elimination(&self) -> bool {
        self.losers.is_some()
    }

    /// Every game in bracket order: winners rounds, losers rounds, grand final, reset.
    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.winners
            .iter()
            .flatten()
            .chain(self.losers.iter().flatten().flatten())
            .chain(self.grand_final.iter())
            .chain(self.grand_final_reset.iter())
    }

    pub fn games_mut(&mut self) -> impl Iterator<Item = &mut Game> {
        self.winners
            .iter_mut()
            .flatten()
            .chain(self.losers.iter_mut().flatten().flatten())
            .chain(self.grand_final.iter_mut())
            .chain(self.grand_final_reset.iter_mut())
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games().find(|g| g.id == id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games_mut().find(|g| g.id == id)
    }

    pub fn position(&self, id: GameId) -> Option<Position> {
        let find = |rounds: &[Vec<Game>]| {
            rounds.iter().enumerate().find_map(|(round, games)| {
                games
                    .iter()
                    .position(|g| g.id == id)
                    .map(|index| (round, index))
            })
        };
        if let Some((round, index)) = find(self.winners.as_slice()) {
            return Some(Position::Winners { round, index });
        }
        if let Some((round, index)) = self.losers.as_deref().and_then(find) {
            return Some(Position::Losers { round, index });
        }
        if self.grand_final.as_ref().is_some_and(|g| g.id == id) {
            return Some(Position::GrandFinal);
        }
        if self.grand_final_reset.as_ref().is_some_and(|g| g.id == id) {
            return Some(Position::GrandFinalReset);
        }
        None
    }

    pub fn game_at(&self, position: Position) -> Option<&Game> {
        match position {
            Position::Winners { round, index } => self.winners.get(round)?.get(index),
            Position::Losers { round, index } => self.losers.as_ref()?.get(round)?.get(index),
            Position::GrandFinal => self.grand_final.as_ref(),
            Position::GrandFinalReset => self.grand_final_reset.as_ref(),
        }
    }

    pub fn game_at_mut(&mut self, position: Position) -> Option<&mut Game> {
        match position {
            Position::Winners { round, index } => self.winners.get_mut(round)?.get_mut(index),
            Position::Losers { round, index } => {
                self.losers.as_mut()?.get_mut(round)?.get_mut(index)
            }
            Position::GrandFinal => self.grand_final.as_mut(),
            Position::GrandFinalReset => self.grand_final_reset.as_mut(),
        }
    }

    /// Number of losers-bracket rounds (0 for single elimination).
    pub fn losers_rounds(&self) -> usize {
        self.losers.as_ref().map_or(0, Vec::len)
    }
}
