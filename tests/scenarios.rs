//! Cross-module scenarios exercising the engine end to end, rather than a
//! single module in isolation.

use benzene::cell::{self, cell_at, Color};
use benzene::constants::{HEIGHT, WIDTH};
use benzene::engine::VcEngine;
use benzene::env::BenzeneEnv;
use benzene::groups::Groups;
use benzene::player::GameState;
use benzene::position::Position;

/// Empty board: no winning connection for Black. Fill an entire column as
/// Black and one must appear — not as a stored VC (NORTH and SOUTH become
/// literally the same group once the column spans both, so there is no
/// pair left to store a connection between), but via the engine's
/// same-captain short-circuit.
#[test]
fn filling_a_column_connects_north_to_south() {
    let env = BenzeneEnv::new();
    let mut engine = VcEngine::new(&env);
    assert!(!engine.has_winning_connection(Color::Black));

    for row in 0..HEIGHT {
        engine.execute_move(Color::Black, cell_at(0, row)).unwrap();
    }
    assert_eq!(engine.groups().captain_of(cell::NORTH), engine.groups().captain_of(cell::SOUTH));
    assert!(engine.has_winning_connection(Color::Black));
}

/// A bridge ladder that never merges NORTH and SOUTH into one group still
/// produces a real stored FULL connection between their (distinct)
/// captains, once the AND rule closes over the empty groups in between.
#[test]
fn bridge_ladder_produces_a_stored_full_connection_without_merging_edges() {
    use benzene::vc::Kind;
    use benzene::vc_builder::VcBuilder;

    let mut pos = Position::new_board();
    // A single Black stone one row in from NORTH, bridged to NORTH by the
    // two row-0 cells it shares with the edge, is the minimal non-merging
    // connection.
    pos.play(Color::Black, cell_at(1, 1)).unwrap();
    let groups = Groups::build(&pos);
    let builder = VcBuilder::new(Default::default());
    let (store, _) = builder.build_from_scratch(&pos, &groups, Color::Black);
    let captain = groups.captain_of(cell_at(1, 1));
    assert_ne!(captain, cell::NORTH);
    let full = store.get(Kind::Full, cell::NORTH, captain);
    assert!(full.is_some_and(|l| !l.is_empty()));
}

/// A wall of one colour splits the rest of the board into two halves, each
/// reachable from the opponent's edges only through that wall's captain —
/// the shape a decomposition detector should recognise.
#[test]
fn a_full_row_wall_leaves_two_independent_regions() {
    let mut pos = Position::new_board();
    let row = HEIGHT / 2;
    for col in 0..WIDTH {
        pos.play(Color::Black, cell_at(col, row)).unwrap();
    }
    let regions = benzene::decomposition::find_regions(&pos);
    assert_eq!(regions.len(), 2, "a full-width wall must split the board in two");
}

/// Building from scratch, playing a sequence of moves with the change log
/// attached, then reverting after each move in turn must restore the store
/// to exactly what it was before that move — incremental builds compose
/// with revert without drift.
#[test]
fn incremental_build_then_revert_round_trips() {
    let env = BenzeneEnv::new();
    let mut engine = VcEngine::new(&env);
    let before = engine.store(Color::Black).clone();

    let moves = [
        cell_at(2, 2),
        cell_at(3, 3),
        cell_at(4, 4),
        cell_at(5, 5),
        cell_at(6, 6),
    ];

    for (i, &m) in moves.iter().enumerate() {
        let color = if i % 2 == 0 { Color::Black } else { Color::White };
        engine.execute_move(color, m).unwrap();
    }
    for _ in 0..moves.len() {
        engine.undo_move().unwrap();
    }

    assert_eq!(engine.position(), &Position::new_board());
    assert_eq!(engine.store(Color::Black), &before);
}

/// Undoing the last of several moves must land back on the position (and
/// rebuilt store) a fresh engine reaches by playing only the earlier moves
/// — revert is correct at an intermediate step, not just once fully
/// unwound back to empty.
#[test]
fn undo_one_move_matches_a_fresh_engine_with_one_fewer_move() {
    let env = BenzeneEnv::new();
    let mut engine = VcEngine::new(&env);
    let moves = [
        (Color::Black, cell_at(1, 1)),
        (Color::White, cell_at(1, 2)),
        (Color::Black, cell_at(2, 1)),
    ];
    for &(color, m) in &moves {
        engine.execute_move(color, m).unwrap();
    }
    engine.undo_move().unwrap();

    let mut reference = VcEngine::new(&env);
    for &(color, m) in &moves[..moves.len() - 1] {
        reference.execute_move(color, m).unwrap();
    }

    assert_eq!(engine.position(), reference.position());
}
