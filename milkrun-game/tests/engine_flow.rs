use chrono::NaiveDate;
use futures::executor::block_on;
use milkrun_game::{
    Difficulty, GameEngine, Intent, MemoryPuzzleProvider, MemoryScoreStore, Node, Point, Puzzle,
    PuzzleProvider, ScoreStore, SessionEvent, Stop,
};

fn puzzle_for(day: u32) -> Puzzle {
    Puzzle::new(
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
        Point::new(0.0, 0.0),
        vec![
            Stop {
                id: 1,
                x: 10.0,
                y: 0.0,
            },
            Stop {
                id: 2,
                x: 10.0,
                y: 10.0,
            },
        ],
        30.0,
    )
    .unwrap()
}

fn engine_with_days(
    days: &[u32],
    difficulty: Difficulty,
) -> GameEngine<MemoryPuzzleProvider, MemoryScoreStore> {
    let mut provider = MemoryPuzzleProvider::new();
    for &day in days {
        let puzzle = puzzle_for(day);
        let solution = vec![
            puzzle.depot_node(),
            Node::from(puzzle.stops[0]),
            Node::from(puzzle.stops[1]),
            puzzle.depot_node(),
        ];
        provider.insert_solution(difficulty, puzzle.date, solution);
        provider.insert_puzzle(difficulty, puzzle);
    }
    GameEngine::new(provider, MemoryScoreStore::new())
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
}

#[test]
fn missing_dates_fall_back_to_the_most_recent_puzzle() {
    let engine = engine_with_days(&[3, 5], Difficulty::Medium);

    let exact = block_on(engine.start_session(Some(date(5)), Difficulty::Medium)).unwrap();
    assert!(!exact.substituted);
    assert_eq!(exact.actual_date, date(5));

    let substituted = block_on(engine.start_session(Some(date(4)), Difficulty::Medium)).unwrap();
    assert!(substituted.substituted);
    assert_eq!(substituted.actual_date, date(3));
    assert_eq!(substituted.session.puzzle().date, date(3));

    let latest = block_on(engine.start_session(None, Difficulty::Medium)).unwrap();
    assert!(!latest.substituted);
    assert_eq!(latest.actual_date, date(5));

    assert!(block_on(engine.start_session(Some(date(2)), Difficulty::Medium)).is_err());
}

#[test]
fn completions_land_in_the_store() {
    let engine = engine_with_days(&[5], Difficulty::Medium);
    let start = block_on(engine.start_session(None, Difficulty::Medium)).unwrap();
    let mut session = start.session;

    let puzzle = session.puzzle().clone();
    for stop in &puzzle.stops {
        session.apply(&Intent::Visit {
            target: Node::from(*stop),
            from: None,
        });
    }
    let SessionEvent::Completed(completion) = session.apply(&Intent::Visit {
        target: puzzle.depot_node(),
        from: None,
    }) else {
        panic!("expected completion");
    };

    let record = engine
        .record_completion(&session, &completion, 1_700_000_000_000)
        .unwrap();
    assert_eq!(record.date, date(5));
    assert_eq!(record.attempts, 1);

    let best = engine
        .store()
        .best_score(date(5), Difficulty::Medium)
        .unwrap()
        .expect("record stored");
    assert_eq!(best, record);

    // Undo and re-close: a second record lands and statistics see both.
    session.apply(&Intent::Undo);
    let SessionEvent::Completed(second) = session.apply(&Intent::Visit {
        target: puzzle.depot_node(),
        from: None,
    }) else {
        panic!("expected second completion");
    };
    engine
        .record_completion(&session, &second, 1_700_000_100_000)
        .unwrap();

    let stats = engine.store().statistics().unwrap();
    assert_eq!(stats.games_played, 2);
    assert_eq!(stats.puzzles_solved, 1);
    assert_eq!(stats.total_attempts, 3);

    // The combined start-with-best path surfaces the stored best.
    let (restart, best) =
        block_on(engine.start_session_with_best(Some(date(5)), Difficulty::Medium)).unwrap();
    assert!(!restart.substituted);
    assert!(best.is_some());
}

#[test]
fn solution_reveal_respects_tier_gating() {
    let engine = engine_with_days(&[5], Difficulty::Medium);
    let mut session = block_on(engine.start_session(None, Difficulty::Medium))
        .unwrap()
        .session;
    assert!(block_on(engine.reveal_solution(&mut session)).unwrap());
    assert!(session.showing_solution());

    // Playback steps through three edges, then reports done.
    assert!(session.step_solution());
    assert!(session.step_solution());
    assert!(!session.step_solution());

    // Toggling off and on restarts from zero.
    session.stop_solution();
    assert!(!session.showing_solution());
    assert!(block_on(engine.reveal_solution(&mut session)).unwrap());
    assert_eq!(session.snapshot().solution.unwrap().index, 0);

    let hard_engine = engine_with_days(&[5], Difficulty::Hard);
    let mut hard_session = block_on(hard_engine.start_session(None, Difficulty::Hard))
        .unwrap()
        .session;
    // Refused before the provider is ever consulted.
    assert!(matches!(
        block_on(hard_engine.reveal_solution(&mut hard_session)),
        Ok(false)
    ));
    assert!(!hard_session.showing_solution());
}

#[test]
fn discovery_lists_published_days() {
    let engine = engine_with_days(&[3, 5, 11], Difficulty::Easy);
    let days = block_on(
        engine
            .provider()
            .available_days(2026, 8, Difficulty::Easy),
    )
    .unwrap();
    assert_eq!(days, vec![3, 5, 11]);
    let none = block_on(
        engine
            .provider()
            .available_days(2026, 9, Difficulty::Easy),
    )
    .unwrap();
    assert!(none.is_empty());

    assert!(block_on(
        engine.provider().puzzle_exists(date(5), Difficulty::Easy)
    ));
    assert!(!block_on(
        engine.provider().puzzle_exists(date(4), Difficulty::Easy)
    ));
}
