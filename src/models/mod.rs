//! Data structures for the tournament: teams, courts, games, clocks and the bracket.

mod bracket;
mod court;
mod game;
mod settings;
mod team;
mod timer;
mod tournament;

pub use bracket::{Bracket, Position};
pub use court::{Court, CourtId};
pub use game::{BracketType, Game, GameId, GameResult, GameSlot, GameStatus, RefereeId, Side};
pub use settings::{AssignPriority, OpenSlotPolicy, Settings, MAX_PHASE_MINUTES};
pub use team::{Team, TeamId};
pub use timer::{Millis, Phase, PhaseDurations, TimerState};
pub use tournament::{ErrorKind, Result, Tournament, TournamentError, TournamentId};
