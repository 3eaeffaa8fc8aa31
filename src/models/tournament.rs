//! Tournament: the state container holding teams, courts, bracket and settings.

use crate::models::bracket::Bracket;
use crate::models::court::{Court, CourtId};
use crate::models::game::{Game, GameId, GameStatus};
use crate::models::settings::Settings;
use crate::models::team::{Team, TeamId};
use crate::models::timer::Phase;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Broad class of a [`TournamentError`], used by callers to decide how to surface it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    InvalidSlot,
    Occupancy,
    State,
    NotFound,
}

/// Errors that can occur during tournament operations. None of them are fatal.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Winner is not playing in this game")]
    WinnerNotInGame(TeamId),
    #[error("Scores cannot be equal when scoring is required")]
    TiedScore,
    #[error("The winner must have the higher score")]
    WinnerScoreMismatch,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("A team with this name already exists")]
    DuplicateTeamName,
    #[error("A court with this name already exists")]
    DuplicateCourtName,
    #[error("At most {max} referees per game (got {given})")]
    TooManyReferees { max: usize, given: usize },
    #[error("A phase can last at most {max} minutes (got {given})")]
    PhaseTooLong { max: u64, given: u64 },
    #[error("Need at least 2 teams to build a bracket")]
    NotEnoughTeams,
    #[error("Game has an open slot that must be resolved first")]
    OpenSlot(GameId),
    #[error("Game has no team on either side")]
    DoubleBye(GameId),
    #[error("Only an open slot can be filled")]
    SlotAlreadyFilled(GameId),
    #[error("A slot can only be set to a team or a bye")]
    InvalidSlotValue,
    #[error("Court already holds an active game")]
    CourtOccupied { court_id: CourtId, game_id: GameId },
    #[error("Cannot {action} a game that is {status:?}")]
    InvalidStatus {
        action: &'static str,
        status: GameStatus,
    },
    #[error("Cannot skip ahead during the {0:?} phase")]
    SkipNotAllowed(Phase),
    #[error("A following game has already started")]
    DownstreamStarted(GameId),
    #[error("Not allowed once games have started")]
    TournamentStarted,
    #[error("Game not found")]
    GameNotFound(GameId),
    #[error("Team not found")]
    TeamNotFound(TeamId),
    #[error("Court not found")]
    CourtNotFound(CourtId),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            WinnerNotInGame(_) | TiedScore | WinnerScoreMismatch | EmptyName
            | DuplicateTeamName | DuplicateCourtName | TooManyReferees { .. }
            | PhaseTooLong { .. } | NotEnoughTeams => ErrorKind::Validation,
            OpenSlot(_) | DoubleBye(_) | SlotAlreadyFilled(_) | InvalidSlotValue => {
                ErrorKind::InvalidSlot
            }
            CourtOccupied { .. } => ErrorKind::Occupancy,
            InvalidStatus { .. } | SkipNotAllowed(_) | DownstreamStarted(_)
            | TournamentStarted => ErrorKind::State,
            GameNotFound(_) | TeamNotFound(_) | CourtNotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, TournamentError>;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Full tournament state. Mutated only through the lifecycle, court and bracket operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub settings: Settings,
    pub teams: Vec<Team>,
    pub courts: Vec<Court>,
    pub bracket: Bracket,
}

impl Tournament {
    /// Create an empty tournament with no teams, courts or bracket.
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            settings,
            teams: Vec::new(),
            courts: Vec::new(),
            bracket: Bracket::default(),
        }
    }

    /// Create a tournament with initial teams. The bracket still has to be generated.
    pub fn with_teams(name: impl Into<String>, teams: Vec<Team>, settings: Settings) -> Self {
        Self {
            teams,
            ..Self::new(name, settings)
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_name(&self, id: TeamId) -> Option<String> {
        self.team(id).map(|t| t.name.clone())
    }

    pub fn court(&self, id: CourtId) -> Option<&Court> {
        self.courts.iter().find(|c| c.id == id)
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.bracket.game(id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.bracket.game_mut(id)
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.bracket.games()
    }

    /// Any game has left `Queued` (started, finished or walked over).
    pub fn has_started(&self) -> bool {
        self.games().any(|g| g.status != GameStatus::Queued)
    }

    /// Add a team. Names must be unique (case-insensitive).
    pub fn add_team(&mut self, name: impl Into<String>, seed: Option<u32>) -> Result<TeamId> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        if self.teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicateTeamName);
        }
        let mut team = Team::new(name);
        team.seed = seed;
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Rename a team. Results already recorded keep the name they were finished with.
    pub fn rename_team(&mut self, team_id: TeamId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        if self
            .teams
            .iter()
            .any(|t| t.id != team_id && t.name.eq_ignore_ascii_case(name))
        {
            return Err(TournamentError::DuplicateTeamName);
        }
        let team = self
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        team.name = name.to_string();
        Ok(())
    }

    /// Add a court. Names must be unique (case-insensitive).
    pub fn add_court(&mut self, name: impl Into<String>) -> Result<CourtId> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        if self.courts.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(TournamentError::DuplicateCourtName);
        }
        let court = Court::new(name);
        let id = court.id;
        self.courts.push(court);
        Ok(id)
    }

    /// Remove a court. Refused while a game that is not finished holds it.
    pub fn remove_court(&mut self, court_id: CourtId) -> Result<()> {
        let idx = self
            .courts
            .iter()
            .position(|c| c.id == court_id)
            .ok_or(TournamentError::CourtNotFound(court_id))?;
        if let Some(game) = self
            .games()
            .find(|g| g.court_id == Some(court_id) && !g.status.is_finished())
        {
            return Err(TournamentError::CourtOccupied {
                court_id,
                game_id: game.id,
            });
        }
        self.courts.remove(idx);
        Ok(())
    }

    /// Replace the settings (only before any game has started). Queued clocks pick up the new budgets.
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        if self.has_started() {
            return Err(TournamentError::TournamentStarted);
        }
        settings.validate()?;
        let timers = settings.initial_timers();
        for game in self.bracket.games_mut() {
            game.timers = timers.clone();
        }
        self.settings = settings;
        Ok(())
    }
}
