//! Integration tests for the game lifecycle: start, pause/resume, skip, finish, restart,
//! slot resolution and team removal.

use court_tournament::{
    assign_game, finish_game, generate_bracket, pause_game, remove_team, restart_game,
    resume_game, set_referees, set_slot, skip_phase, start_game, tick_all, tick_game, ErrorKind,
    GameSlot, GameStatus, OpenSlotPolicy, Phase, Settings, Side, Team, TeamId, Tournament,
    TournamentError, MAX_PHASE_MINUTES,
};
use uuid::Uuid;

const SEC: i64 = 1000;

/// Tournament with `n` seeded teams ("T1".."Tn") and a generated bracket.
fn tournament(n: usize, settings: Settings) -> Tournament {
    let teams: Vec<Team> = (0..n)
        .map(|i| Team::with_seed(format!("T{}", i + 1), i as u32 + 1))
        .collect();
    let mut t = Tournament::with_teams("Cup", teams, settings);
    generate_bracket(&mut t).unwrap();
    t
}

fn team(t: &Tournament, n: usize) -> TeamId {
    t.teams[n - 1].id
}

#[test]
fn start_moves_queued_game_into_warmup() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    assert_eq!(start_game(&mut t, game_id, 0), Ok(GameStatus::Warmup));
    let game = t.game(game_id).unwrap();
    assert_eq!(game.timers.current_phase, Phase::Warmup);
    assert_eq!(game.timers.started_at, Some(0));
    assert_eq!(
        start_game(&mut t, game_id, 0),
        Err(TournamentError::InvalidStatus {
            action: "start",
            status: GameStatus::Warmup
        })
    );
}

#[test]
fn bye_game_finishes_on_start() {
    // 3 teams in a bracket of 4: seed 1 meets the missing seed 4.
    let mut t = tournament(3, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    assert_eq!(t.game(game_id).unwrap().team_b, GameSlot::Bye);

    assert_eq!(start_game(&mut t, game_id, 0), Ok(GameStatus::Finished));
    let game = t.game(game_id).unwrap();
    let result = game.result.as_ref().unwrap();
    assert_eq!(result.winner_id, team(&t, 1));
    assert_eq!((result.score_a, result.score_b), (1, 0));
    assert_eq!(result.team_a_name.as_deref(), Some("T1"));
    assert_eq!(result.team_b_name, None);
    // The winner moves on to the final.
    assert_eq!(t.bracket.winners[1][0].team_a, GameSlot::team(team(&t, 1)));
}

#[test]
fn open_slot_blocks_start_unless_policy_says_bye() {
    let mut t = tournament(3, Settings::default());
    let bye_game = t.bracket.winners[0][0].id;
    let final_id = t.bracket.winners[1][0].id;
    start_game(&mut t, bye_game, 0).unwrap();

    let err = start_game(&mut t, final_id, 0).unwrap_err();
    assert_eq!(err, TournamentError::OpenSlot(final_id));
    assert_eq!(err.kind(), ErrorKind::InvalidSlot);

    t.settings.open_slot_policy = OpenSlotPolicy::Bye;
    assert_eq!(start_game(&mut t, final_id, 0), Ok(GameStatus::Finished));
    assert_eq!(t.game(final_id).unwrap().team_b, GameSlot::Bye);
}

#[test]
fn pause_and_resume_restore_the_phase_status() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    start_game(&mut t, game_id, 0).unwrap();

    pause_game(&mut t, game_id, 60 * SEC).unwrap();
    assert_eq!(t.game(game_id).unwrap().status, GameStatus::Paused);
    assert_eq!(t.game(game_id).unwrap().timers.paused_at, Some(60 * SEC));
    assert!(pause_game(&mut t, game_id, 61 * SEC).is_err());

    assert_eq!(resume_game(&mut t, game_id, 90 * SEC), Ok(GameStatus::Warmup));
    let game = t.game(game_id).unwrap();
    assert_eq!(game.timers.paused_at, None);
    assert_eq!(game.timers.total_paused_time, 30 * SEC);

    skip_phase(&mut t, game_id, 100 * SEC).unwrap();
    pause_game(&mut t, game_id, 110 * SEC).unwrap();
    assert_eq!(resume_game(&mut t, game_id, 120 * SEC), Ok(GameStatus::Live));
}

#[test]
fn pause_on_finished_game_is_a_no_op() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    let winner = team(&t, 1);
    finish_game(&mut t, game_id, winner, 3, 1, 0).unwrap();
    assert_eq!(pause_game(&mut t, game_id, 10 * SEC), Ok(()));
    assert_eq!(t.game(game_id).unwrap().status, GameStatus::Finished);
    assert!(matches!(
        resume_game(&mut t, game_id, 10 * SEC),
        Err(TournamentError::InvalidStatus { .. })
    ));
}

#[test]
fn skip_requires_a_running_game_and_flex_time() {
    let settings = Settings {
        flex_minutes: 0,
        ..Settings::default()
    };
    let mut t = tournament(4, settings);
    let game_id = t.bracket.winners[0][0].id;
    assert!(matches!(
        skip_phase(&mut t, game_id, 0),
        Err(TournamentError::InvalidStatus { action: "skip", .. })
    ));
    start_game(&mut t, game_id, 0).unwrap();
    assert_eq!(skip_phase(&mut t, game_id, 5 * SEC), Ok(Phase::Game));
    assert_eq!(t.game(game_id).unwrap().status, GameStatus::Live);
    assert_eq!(
        skip_phase(&mut t, game_id, 6 * SEC),
        Err(TournamentError::SkipNotAllowed(Phase::Game))
    );
}

#[test]
fn ticks_drive_status_through_the_phases() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    start_game(&mut t, game_id, 0).unwrap();

    assert_eq!(tick_game(&mut t, game_id, 299 * SEC), Ok(None));
    assert_eq!(tick_game(&mut t, game_id, 300 * SEC), Ok(Some(Phase::Game)));
    assert_eq!(t.game(game_id).unwrap().status, GameStatus::Live);
    assert_eq!(tick_game(&mut t, game_id, 1500 * SEC), Ok(Some(Phase::Flex)));
    assert_eq!(t.game(game_id).unwrap().status, GameStatus::Flex);
    assert_eq!(tick_game(&mut t, game_id, 1800 * SEC), Ok(Some(Phase::Overtime)));
    assert_eq!(t.game(game_id).unwrap().status, GameStatus::Flex);
    assert_eq!(tick_game(&mut t, game_id, 1860 * SEC), Ok(None));
    assert_eq!(t.game(game_id).unwrap().timers.overtime_minutes, Some(1));
}

#[test]
fn tick_all_only_touches_running_games() {
    let mut t = tournament(4, Settings::default());
    let first = t.bracket.winners[0][0].id;
    let second = t.bracket.winners[0][1].id;
    start_game(&mut t, first, 0).unwrap();
    start_game(&mut t, second, 0).unwrap();
    pause_game(&mut t, second, 10 * SEC).unwrap();

    let report = tick_all(&mut t, 300 * SEC);
    assert_eq!(report.ticked, 1);
    assert_eq!(report.transitions, 1);
    assert_eq!(report.failures, 0);
    assert_eq!(t.game(first).unwrap().status, GameStatus::Live);
    assert_eq!(t.game(second).unwrap().status, GameStatus::Paused);
}

#[test]
fn finish_validates_winner_and_scores() {
    let settings = Settings {
        scoring_required: true,
        ..Settings::default()
    };
    let mut t = tournament(4, settings);
    let game_id = t.bracket.winners[0][0].id;
    let (t1, t2) = (team(&t, 1), team(&t, 2));

    assert_eq!(
        finish_game(&mut t, game_id, t2, 2, 1, 0),
        Err(TournamentError::WinnerNotInGame(t2))
    );
    assert_eq!(finish_game(&mut t, game_id, t1, 2, 2, 0), Err(TournamentError::TiedScore));
    let err = finish_game(&mut t, game_id, t1, 1, 2, 0).unwrap_err();
    assert_eq!(err, TournamentError::WinnerScoreMismatch);
    assert_eq!(err.kind(), ErrorKind::Validation);

    finish_game(&mut t, game_id, t1, 2, 1, 0).unwrap();
    assert!(matches!(
        finish_game(&mut t, game_id, t1, 2, 1, 0),
        Err(TournamentError::InvalidStatus { action: "finish", .. })
    ));
}

#[test]
fn finish_frees_the_court_and_keeps_names() {
    let mut t = tournament(4, Settings::default());
    let court = t.add_court("Court 1").unwrap();
    let game_id = t.bracket.winners[0][0].id;
    assign_game(&mut t, game_id, court).unwrap();
    start_game(&mut t, game_id, 0).unwrap();
    assert_eq!(t.game(game_id).unwrap().court_id, Some(court));

    let t4 = team(&t, 4);
    finish_game(&mut t, game_id, t4, 0, 5, 10 * SEC).unwrap();
    t.rename_team(t4, "Renamed").unwrap();

    let game = t.game(game_id).unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.court_id, None);
    let result = game.result.as_ref().unwrap();
    assert_eq!(result.team_a_name.as_deref(), Some("T1"));
    assert_eq!(result.team_b_name.as_deref(), Some("T4"));
    assert_eq!(result.finished_at.timestamp_millis(), 10 * SEC);
}

#[test]
fn restart_resets_an_active_game() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    start_game(&mut t, game_id, 0).unwrap();
    pause_game(&mut t, game_id, 20 * SEC).unwrap();

    restart_game(&mut t, game_id).unwrap();
    let game = t.game(game_id).unwrap();
    assert_eq!(game.status, GameStatus::Queued);
    assert_eq!(game.timers, t.settings.initial_timers());
}

#[test]
fn restart_of_finished_game_withdraws_its_result() {
    let mut t = tournament(4, Settings::default());
    let semi = t.bracket.winners[0][0].id;
    let other_semi = t.bracket.winners[0][1].id;
    let final_id = t.bracket.winners[1][0].id;
    let (t1, t2) = (team(&t, 1), team(&t, 2));

    finish_game(&mut t, semi, t1, 1, 0, 0).unwrap();
    assert_eq!(t.game(final_id).unwrap().team_a, GameSlot::team(t1));
    restart_game(&mut t, semi).unwrap();
    assert_eq!(t.game(semi).unwrap().result, None);
    assert_eq!(t.game(final_id).unwrap().team_a, GameSlot::Open);

    finish_game(&mut t, semi, t1, 1, 0, 0).unwrap();
    finish_game(&mut t, other_semi, t2, 1, 0, 0).unwrap();
    start_game(&mut t, final_id, 0).unwrap();
    assert_eq!(
        restart_game(&mut t, semi),
        Err(TournamentError::DownstreamStarted(final_id))
    );
}

#[test]
fn set_slot_fills_only_open_slots() {
    let mut t = tournament(4, Settings::default());
    let final_id = t.bracket.winners[1][0].id;
    let t3 = team(&t, 3);

    assert_eq!(
        set_slot(&mut t, final_id, Side::A, GameSlot::Open),
        Err(TournamentError::InvalidSlotValue)
    );
    let ghost = Uuid::new_v4();
    assert_eq!(
        set_slot(&mut t, final_id, Side::A, GameSlot::team(ghost)),
        Err(TournamentError::TeamNotFound(ghost))
    );
    set_slot(&mut t, final_id, Side::A, GameSlot::team(t3)).unwrap();
    assert_eq!(t.game(final_id).unwrap().team_a, GameSlot::team(t3));
    assert_eq!(
        set_slot(&mut t, final_id, Side::A, GameSlot::Bye),
        Err(TournamentError::SlotAlreadyFilled(final_id))
    );
}

#[test]
fn referees_are_bounded_by_settings() {
    let settings = Settings {
        referees_per_game: Some(1),
        ..Settings::default()
    };
    let mut t = tournament(4, settings);
    let game_id = t.bracket.winners[0][0].id;
    let refs = vec![Uuid::new_v4(), Uuid::new_v4()];
    assert_eq!(
        set_referees(&mut t, game_id, refs.clone()),
        Err(TournamentError::TooManyReferees { max: 1, given: 2 })
    );
    set_referees(&mut t, game_id, refs[..1].to_vec()).unwrap();
    assert_eq!(t.game(game_id).unwrap().ref_ids, refs[..1].to_vec());
}

#[test]
fn removing_a_team_turns_its_games_into_walkovers() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    let (t1, t4) = (team(&t, 1), team(&t, 4));
    start_game(&mut t, game_id, 0).unwrap();

    assert_eq!(remove_team(&mut t, t4, 30 * SEC), Ok(1));
    assert!(t.team(t4).is_none());
    let game = t.game(game_id).unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.team_b, GameSlot::Bye);
    assert_eq!(game.result.as_ref().unwrap().winner_id, t1);
    assert_eq!(t.bracket.winners[1][0].team_a, GameSlot::team(t1));

    assert_eq!(remove_team(&mut t, t4, 30 * SEC), Err(TournamentError::TeamNotFound(t4)));
}

#[test]
fn settings_are_frozen_once_play_starts() {
    let mut t = tournament(4, Settings::default());
    let longer = Settings {
        warmup_minutes: 10,
        ..Settings::default()
    };
    t.set_settings(longer.clone()).unwrap();
    assert_eq!(t.bracket.winners[0][0].timers.warmup_remaining, 600);

    let game_id = t.bracket.winners[0][0].id;
    start_game(&mut t, game_id, 0).unwrap();
    assert_eq!(t.set_settings(longer), Err(TournamentError::TournamentStarted));
}

#[test]
fn refused_start_under_bye_policy_keeps_open_slots() {
    let settings = Settings {
        open_slot_policy: OpenSlotPolicy::Bye,
        ..Settings::default()
    };
    let mut t = tournament(4, settings);
    let semi = t.bracket.winners[0][0].id;
    let final_id = t.bracket.winners[1][0].id;
    let before = t.game(final_id).unwrap().clone();

    assert_eq!(
        start_game(&mut t, final_id, 0),
        Err(TournamentError::DoubleBye(final_id))
    );
    assert_eq!(t.game(final_id).unwrap(), &before);

    let t1 = team(&t, 1);
    finish_game(&mut t, semi, t1, 0, 0, 0).unwrap();
    assert_eq!(t.game(final_id).unwrap().team_a, GameSlot::team(t1));
    assert_eq!(t.game(final_id).unwrap().team_b, GameSlot::Open);
}

#[test]
fn refused_transitions_leave_the_game_unchanged() {
    let mut t = tournament(4, Settings::default());
    let game_id = t.bracket.winners[0][0].id;
    let final_id = t.bracket.winners[1][0].id;
    let outsider = team(&t, 2);

    let queued = t.game(game_id).unwrap().clone();
    assert!(pause_game(&mut t, game_id, 0).is_err());
    assert!(skip_phase(&mut t, game_id, 0).is_err());
    assert_eq!(t.game(game_id).unwrap(), &queued);

    let open_final = t.game(final_id).unwrap().clone();
    assert!(start_game(&mut t, final_id, 0).is_err());
    assert_eq!(t.game(final_id).unwrap(), &open_final);

    start_game(&mut t, game_id, 0).unwrap();
    for now in [10, 20, 30] {
        skip_phase(&mut t, game_id, now * SEC).unwrap();
    }
    let in_overtime = t.game(game_id).unwrap().clone();
    assert_eq!(in_overtime.timers.current_phase, Phase::Overtime);
    assert_eq!(
        skip_phase(&mut t, game_id, 40 * SEC),
        Err(TournamentError::SkipNotAllowed(Phase::Overtime))
    );
    assert!(finish_game(&mut t, game_id, outsider, 1, 0, 40 * SEC).is_err());
    assert!(start_game(&mut t, game_id, 40 * SEC).is_err());
    assert_eq!(t.game(game_id).unwrap(), &in_overtime);
}

#[test]
fn refused_restart_leaves_the_bracket_unchanged() {
    let mut t = tournament(4, Settings::default());
    let semi = t.bracket.winners[0][0].id;
    let other_semi = t.bracket.winners[0][1].id;
    let final_id = t.bracket.winners[1][0].id;
    let winner = team(&t, 1);
    finish_game(&mut t, semi, winner, 1, 0, 0).unwrap();
    let other_winner = team(&t, 2);
    finish_game(&mut t, other_semi, other_winner, 1, 0, 0).unwrap();
    start_game(&mut t, final_id, 0).unwrap();

    let bracket = t.bracket.clone();
    assert!(restart_game(&mut t, semi).is_err());
    assert_eq!(t.bracket, bracket);
}

#[test]
fn restart_keeps_a_slot_filled_by_hand() {
    let mut t = tournament(4, Settings::default());
    let semi = t.bracket.winners[0][0].id;
    let final_id = t.bracket.winners[1][0].id;
    let (t1, t3) = (team(&t, 1), team(&t, 3));

    set_slot(&mut t, final_id, Side::A, GameSlot::team(t3)).unwrap();
    finish_game(&mut t, semi, t1, 1, 0, 0).unwrap();
    assert_eq!(t.game(final_id).unwrap().team_a, GameSlot::team(t3));

    restart_game(&mut t, semi).unwrap();
    assert_eq!(t.game(final_id).unwrap().team_a, GameSlot::team(t3));
    assert_eq!(t.game(semi).unwrap().status, GameStatus::Queued);
}

#[test]
fn oversized_phase_lengths_are_rejected() {
    let mut t = tournament(4, Settings::default());
    let huge = Settings {
        warmup_minutes: u64::MAX / 2,
        ..Settings::default()
    };
    let err = t.set_settings(huge.clone()).unwrap_err();
    assert_eq!(
        err,
        TournamentError::PhaseTooLong {
            max: MAX_PHASE_MINUTES,
            given: u64::MAX / 2
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(t.settings, Settings::default());
    assert_eq!(t.bracket.winners[0][0].timers.warmup_remaining, 300);

    // Budgets saturate instead of overflowing.
    assert_eq!(huge.durations().warmup_secs, u64::MAX);

    let longest = Settings {
        game_length_minutes: MAX_PHASE_MINUTES,
        ..Settings::default()
    };
    t.set_settings(longest).unwrap();
}
