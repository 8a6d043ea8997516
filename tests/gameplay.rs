//! End-to-end play on the default 10x20 board through the public API.

use blockfall::{
    Board, Cell, ColorId, Command, FixedSequence, GameConfig, GameEvent, GameState, Phase,
    PieceKind,
};
use std::time::Duration;

const MS: Duration = Duration::from_millis(1);

fn game(kinds: &[PieceKind]) -> GameState {
    GameState::with_source(&GameConfig::default(), Box::new(FixedSequence::new(kinds))).unwrap()
}

fn filled(board: &Board, x: i32, y: i32) -> bool {
    board.get(x, y).is_some_and(Cell::is_filled)
}

#[test]
fn o_pieces_stack_from_the_floor() {
    let mut state = game(&[PieceKind::O]);
    assert_eq!((state.active().x(), state.active().y()), (4, 0));

    state.press(Command::HardDrop);
    for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
        assert!(filled(state.board(), x, y), "({x}, {y}) should be filled");
    }

    state.press(Command::HardDrop);
    for (x, y) in [(4, 16), (5, 16), (4, 17), (5, 17)] {
        assert!(filled(state.board(), x, y), "({x}, {y}) should be filled");
    }
    assert_eq!(state.score(), 0);
    assert_eq!(state.lines(), 0);
}

#[test]
fn completing_bottom_row_clears_it_and_shifts_the_rest() {
    let mut state = game(&[PieceKind::O]);
    for x in (0..10).filter(|x| !(4..6).contains(x)) {
        state.board_mut().set(x, 19, Cell::Filled(ColorId(6)));
    }
    state.board_mut().set(0, 10, Cell::Filled(ColorId(2)));

    state.press(Command::HardDrop);

    assert_eq!(state.score(), 100);
    assert_eq!(state.lines(), 1);
    // Only the O's upper half survives, now on the floor.
    let bottom: Vec<bool> = (0..10).map(|x| filled(state.board(), x, 19)).collect();
    assert_eq!(
        bottom,
        [false, false, false, false, true, true, false, false, false, false]
    );
    assert!((0..10).all(|x| !filled(state.board(), x, 18)));
    assert_eq!(state.board().get(0, 11), Some(Cell::Filled(ColorId(2))));
    assert_eq!(state.board().get(0, 10), Some(Cell::Empty));

    let events = state.take_events();
    assert_eq!(events.first(), Some(&GameEvent::Locked));
    assert_eq!(events.last(), Some(&GameEvent::LinesCleared(1)));
    assert_eq!(events.len(), 3);
}

#[test]
fn blocked_spawn_ends_the_game_until_restart() {
    let mut state = game(&[PieceKind::O, PieceKind::I]);
    // The I spawns across columns 3..7 of the top row.
    for x in 0..4 {
        state.board_mut().set(x, 0, Cell::Filled(ColorId(1)));
    }
    state.press(Command::HardDrop);
    assert_eq!(state.phase(), Phase::GameOver);

    let board = state.board().clone();
    state.press(Command::MoveLeft);
    state.press(Command::Rotate);
    state.press(Command::HardDrop);
    state.tick(Duration::from_secs(10), &());
    assert_eq!(state.board(), &board);
    assert!(state.is_game_over());

    state.press(Command::Restart);
    assert_eq!(state.phase(), Phase::Falling);
    assert_eq!(state.score(), 0);
    assert!(state.board().rows().flatten().all(|c| !c.is_filled()));
}

#[test]
fn gravity_then_lock_delay_commits_the_piece() {
    let mut state = game(&[PieceKind::O]);
    for _ in 0..18 {
        state.tick(500 * MS, &());
    }
    assert_eq!(state.active().y(), 18);
    assert_eq!(state.phase(), Phase::Falling);

    state.tick(500 * MS, &());
    assert_eq!(state.phase(), Phase::Locking);
    state.tick(500 * MS, &());
    assert!(state.take_events().is_empty());
    state.tick(500 * MS, &());

    assert_eq!(state.take_events(), [GameEvent::Locked]);
    assert!(filled(state.board(), 4, 19));
    assert_eq!((state.active().y(), state.phase()), (0, Phase::Falling));
}

#[test]
fn failed_move_changes_nothing() {
    let mut state = game(&[PieceKind::T]);
    while state.try_move(-1, 0) {}
    let board = state.board().clone();
    let piece = state.active().clone();

    assert!(!state.try_move(-1, 0));
    assert_eq!(state.board(), &board);
    assert_eq!(state.active(), &piece);
    assert_eq!(state.score(), 0);
}

#[test]
fn random_games_never_leave_a_full_row() {
    for seed in 0..8 {
        let config = GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        };
        let mut state = GameState::new(&config).unwrap();
        let moves = [
            Command::MoveLeft,
            Command::MoveRight,
            Command::Rotate,
            Command::MoveLeft,
        ];
        for turn in 0..400usize {
            if state.is_game_over() {
                break;
            }
            for &m in moves.iter().take(turn % 5) {
                state.press(m);
            }
            for _ in 0..turn % 4 {
                state.press(Command::MoveRight);
            }
            state.press(Command::HardDrop);
            assert!(!state.board().has_full_row(), "seed {seed}, turn {turn}");
            assert_eq!(state.score(), state.lines() * 100);
        }
    }
}
