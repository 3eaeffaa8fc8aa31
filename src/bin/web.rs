//! Single binary web server: JSON API over in-memory tournaments, plus the 1 Hz tick driver.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), TICK_INTERVAL_MS (e.g. 1000).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use court_tournament::{
    assign_game, auto_assign, clear_all_courts, current_round_number, eligible_games, evaluate,
    finish_game, format_clock, generate_bracket, pause_game, remaining_time, remove_team,
    restart_game, resume_game, set_referees, set_slot, skip_phase, start_game, tick_all,
    unassign_game, CourtId, ErrorKind, Game, GameId, GameSlot, GameStatus, Millis,
    Phase, RefereeId, Settings, Side, Standing, TeamId, TickDriver, Tournament, TournamentError,
    TournamentId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    settings: Settings,
}

#[derive(Deserialize)]
struct TeamBody {
    name: String,
    #[serde(default)]
    seed: Option<u32>,
}

#[derive(Deserialize)]
struct CourtBody {
    name: String,
}

#[derive(Deserialize)]
struct FinishBody {
    winner_id: TeamId,
    #[serde(default)]
    score_a: u32,
    #[serde(default)]
    score_b: u32,
}

#[derive(Deserialize)]
struct SlotBody {
    side: Side,
    slot: GameSlot,
}

#[derive(Deserialize)]
struct RefereesBody {
    ref_ids: Vec<RefereeId>,
}

#[derive(Deserialize)]
struct AssignBody {
    court_id: CourtId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TournamentId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct CourtPath {
    id: TournamentId,
    court_id: CourtId,
}

#[derive(Deserialize)]
struct GamePath {
    id: TournamentId,
    game_id: GameId,
}

/// Presentation label for a round; the core itself never formats labels.
fn round_label(round_index: usize, total_rounds: usize, games_in_round: usize) -> String {
    let from_end = total_rounds.saturating_sub(round_index + 1);
    match (from_end, games_in_round) {
        (0, 1) => "Final".to_string(),
        (1, 2) => "Semi-Finals".to_string(),
        (2, 4) => "Quarter-Finals".to_string(),
        _ => format!("Round {}", round_index + 1),
    }
}

#[derive(Serialize)]
struct GameView {
    id: GameId,
    label: String,
    status: GameStatus,
    phase: Phase,
    clock: String,
    team_a: String,
    team_b: String,
    court: Option<String>,
    eligible: bool,
}

#[derive(Serialize)]
struct TournamentView<'a> {
    tournament: &'a Tournament,
    standing: Standing,
    current_round: Option<usize>,
    games: Vec<GameView>,
}

fn slot_label(t: &Tournament, slot: &GameSlot) -> String {
    match slot {
        GameSlot::Team { team_id } => t.team_name(*team_id).unwrap_or_else(|| "?".to_string()),
        GameSlot::Bye => "BYE".to_string(),
        GameSlot::Open => "TBD".to_string(),
    }
}

fn game_view(t: &Tournament, game: &Game, label: String, eligible: &HashSet<GameId>, now: Millis) -> GameView {
    let remaining = remaining_time(&game.timers, &t.settings.durations(), now);
    let clock = match game.timers.current_phase {
        Phase::Overtime => format!("+{}", format_clock(remaining)),
        _ => format_clock(remaining),
    };
    GameView {
        id: game.id,
        label,
        status: game.status,
        phase: game.timers.current_phase,
        clock,
        team_a: slot_label(t, &game.team_a),
        team_b: slot_label(t, &game.team_b),
        court: game.court_id.and_then(|c| t.court(c)).map(|c| c.name.clone()),
        eligible: eligible.contains(&game.id),
    }
}

fn tournament_view(t: &Tournament, now: Millis) -> TournamentView<'_> {
    let eligible: HashSet<GameId> = eligible_games(t).into_iter().collect();
    let mut games = Vec::new();
    let winners_rounds = t.bracket.winners.len();
    for (r, round) in t.bracket.winners.iter().enumerate() {
        let label = round_label(r, winners_rounds, round.len());
        games.extend(round.iter().map(|g| game_view(t, g, label.clone(), &eligible, now)));
    }
    for round in t.bracket.losers.iter().flatten() {
        games.extend(round.iter().map(|g| {
            game_view(t, g, format!("Losers Round {}", g.round), &eligible, now)
        }));
    }
    for (game, label) in [
        (&t.bracket.grand_final, "Grand Final"),
        (&t.bracket.grand_final_reset, "Grand Final Reset"),
    ] {
        if let Some(g) = game {
            games.push(game_view(t, g, label.to_string(), &eligible, now));
        }
    }
    TournamentView {
        tournament: t,
        standing: evaluate(&t.bracket),
        current_round: current_round_number(&t.bracket),
        games,
    }
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation | ErrorKind::InvalidSlot => HttpResponse::BadRequest().json(body),
        ErrorKind::Occupancy | ErrorKind::State => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
    }
}

/// Run an operation on one tournament and respond with its new state.
fn update<F>(state: &AppState, id: TournamentId, op: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament, Millis) -> Result<(), TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match op(t, now_millis()) {
        Ok(()) => HttpResponse::Ok().json(&*t),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-tournament",
    })
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Option<Json<CreateTournamentBody>>) -> HttpResponse {
    let (name, settings) = body
        .map(|b| {
            let b = b.into_inner();
            (b.name, b.settings)
        })
        .unwrap_or_default();
    if let Err(e) = settings.validate() {
        return error_response(&e);
    }
    let tournament = Tournament::new(name, settings);
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    log::info!("Created tournament {}", id);
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |_, _| Ok(()))
}

/// Tournament with standing, current round and per-game clocks and labels.
#[get("/api/tournaments/{id}/view")]
async fn api_view_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(tournament_view(&entry.tournament, now_millis())),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

#[put("/api/tournaments/{id}/settings")]
async fn api_set_settings(state: AppState, path: Path<TournamentPath>, body: Json<Settings>) -> HttpResponse {
    update(&state, path.id, |t, _| t.set_settings(body.into_inner()))
}

#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<TeamBody>) -> HttpResponse {
    update(&state, path.id, |t, _| t.add_team(body.name.as_str(), body.seed).map(|_| ()))
}

#[put("/api/tournaments/{id}/teams/{team_id}")]
async fn api_rename_team(state: AppState, path: Path<TeamPath>, body: Json<TeamBody>) -> HttpResponse {
    update(&state, path.id, |t, _| t.rename_team(path.team_id, body.name.as_str()))
}

/// Remove a team; its unfinished games become BYEs (walkovers where an opponent is present).
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    update(&state, path.id, |t, now| remove_team(t, path.team_id, now).map(|_| ()))
}

#[post("/api/tournaments/{id}/courts")]
async fn api_add_court(state: AppState, path: Path<TournamentPath>, body: Json<CourtBody>) -> HttpResponse {
    update(&state, path.id, |t, _| t.add_court(body.name.as_str()).map(|_| ()))
}

#[delete("/api/tournaments/{id}/courts/{court_id}")]
async fn api_remove_court(state: AppState, path: Path<CourtPath>) -> HttpResponse {
    update(&state, path.id, |t, _| t.remove_court(path.court_id))
}

/// Fill every free court with the next eligible game.
#[post("/api/tournaments/{id}/courts/auto-assign")]
async fn api_auto_assign(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t, _| {
        auto_assign(t);
        Ok(())
    })
}

/// Take every queued game off its court.
#[post("/api/tournaments/{id}/courts/clear")]
async fn api_clear_courts(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t, _| {
        clear_all_courts(t);
        Ok(())
    })
}

#[post("/api/tournaments/{id}/bracket/generate")]
async fn api_generate_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    update(&state, path.id, |t, _| generate_bracket(t))
}

#[post("/api/tournaments/{id}/games/{game_id}/start")]
async fn api_start_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    update(&state, path.id, |t, now| start_game(t, path.game_id, now).map(|_| ()))
}

#[post("/api/tournaments/{id}/games/{game_id}/pause")]
async fn api_pause_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    update(&state, path.id, |t, now| pause_game(t, path.game_id, now))
}

#[post("/api/tournaments/{id}/games/{game_id}/resume")]
async fn api_resume_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    update(&state, path.id, |t, now| resume_game(t, path.game_id, now).map(|_| ()))
}

#[post("/api/tournaments/{id}/games/{game_id}/skip")]
async fn api_skip_phase(state: AppState, path: Path<GamePath>) -> HttpResponse {
    update(&state, path.id, |t, now| skip_phase(t, path.game_id, now).map(|_| ()))
}

#[post("/api/tournaments/{id}/games/{game_id}/finish")]
async fn api_finish_game(state: AppState, path: Path<GamePath>, body: Json<FinishBody>) -> HttpResponse {
    update(&state, path.id, |t, now| {
        finish_game(t, path.game_id, body.winner_id, body.score_a, body.score_b, now)
    })
}

#[post("/api/tournaments/{id}/games/{game_id}/restart")]
async fn api_restart_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    update(&state, path.id, |t, _| restart_game(t, path.game_id))
}

#[put("/api/tournaments/{id}/games/{game_id}/slot")]
async fn api_set_slot(state: AppState, path: Path<GamePath>, body: Json<SlotBody>) -> HttpResponse {
    update(&state, path.id, |t, _| set_slot(t, path.game_id, body.side, body.slot))
}

#[put("/api/tournaments/{id}/games/{game_id}/referees")]
async fn api_set_referees(state: AppState, path: Path<GamePath>, body: Json<RefereesBody>) -> HttpResponse {
    update(&state, path.id, |t, _| set_referees(t, path.game_id, body.into_inner().ref_ids))
}

#[put("/api/tournaments/{id}/games/{game_id}/court")]
async fn api_assign_game(state: AppState, path: Path<GamePath>, body: Json<AssignBody>) -> HttpResponse {
    update(&state, path.id, |t, _| assign_game(t, path.game_id, body.court_id))
}

#[delete("/api/tournaments/{id}/games/{game_id}/court")]
async fn api_unassign_game(state: AppState, path: Path<GamePath>) -> HttpResponse {
    update(&state, path.id, |t, _| unassign_game(t, path.game_id))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_tick_interval() -> Duration {
    Duration::from_millis(1000)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let tick_interval = std::env::var("TICK_INTERVAL_MS")
        .ok()
        .and_then(|ms| ms.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(default_tick_interval);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Tick driver: advance the clock of every running game in every tournament
    let state_tick = state.clone();
    let mut driver = TickDriver::start(tick_interval, move || {
        let mut g = match state_tick.write() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        let now = now_millis();
        for entry in g.values_mut() {
            let report = tick_all(&mut entry.tournament, now);
            if report.transitions > 0 || report.failures > 0 {
                log::debug!("Tournament {}: {:?}", entry.tournament.id, report);
            }
        }
    });

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_view_tournament)
            .service(api_set_settings)
            .service(api_add_team)
            .service(api_rename_team)
            .service(api_remove_team)
            .service(api_add_court)
            .service(api_remove_court)
            .service(api_auto_assign)
            .service(api_clear_courts)
            .service(api_generate_bracket)
            .service(api_start_game)
            .service(api_pause_game)
            .service(api_resume_game)
            .service(api_skip_phase)
            .service(api_finish_game)
            .service(api_restart_game)
            .service(api_set_slot)
            .service(api_set_referees)
            .service(api_assign_game)
            .service(api_unassign_game)
    })
    .bind(bind)?
    .run()
    .await;

    driver.stop().await;
    result
}
