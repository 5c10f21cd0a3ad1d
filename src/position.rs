//! Position surface: stone placement, undo, and Zobrist hashing.
//!
//! Mirrors the play/undo contract of the engine this crate descends from,
//! generalised from a single occupied/empty board to the three disjoint
//! bit-sets (black, white, played) the Hex invariants in the data model
//! require.

use crate::bitset::BitSet;
use crate::cell::{is_interior, Cell, Color};
use crate::error::{BenzeneError, Result};
use std::sync::OnceLock;

/// A Hex position: which cells are black, white, and played, plus whose
/// turn it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    black: BitSet,
    white: BitSet,
    played: BitSet,
    to_play: Color,
}

impl Position {
    /// An empty position with Black to play.
    pub fn new_board() -> Self {
        Position {
            black: BitSet::new(),
            white: BitSet::new(),
            played: BitSet::new(),
            to_play: Color::Black,
        }
    }

    pub fn black(&self) -> &BitSet {
        &self.black
    }

    pub fn white(&self) -> &BitSet {
        &self.white
    }

    pub fn played(&self) -> &BitSet {
        &self.played
    }

    pub fn to_play(&self) -> Color {
        self.to_play
    }

    pub fn color_at(&self, c: Cell) -> Color {
        if self.black.test(c) {
            Color::Black
        } else if self.white.test(c) {
            Color::White
        } else {
            Color::Empty
        }
    }

    /// Places a stone of `color` at `cell`. The turn alternates automatically.
    pub fn play(&mut self, color: Color, cell: Cell) -> Result<()> {
        if !is_interior(cell) {
            return Err(BenzeneError::bad_input(format!(
                "cannot play on non-interior cell {cell}"
            )));
        }
        if self.played.test(cell) {
            return Err(BenzeneError::bad_input(format!("cell {cell} already played")));
        }
        match color {
            Color::Black => self.black.set(cell),
            Color::White => self.white.set(cell),
            Color::Empty => return Err(BenzeneError::bad_input("cannot play Empty")),
        }
        self.played.set(cell);
        self.to_play = color.opponent();
        self.check_invariant()
    }

    /// Removes a previously played stone, restoring the position to the
    /// state before that stone was placed. `to_play` becomes the colour
    /// that had played the removed stone.
    pub fn undo(&mut self, cell: Cell) -> Result<()> {
        if !self.played.test(cell) {
            return Err(BenzeneError::bad_input(format!("cell {cell} was not played")));
        }
        let color = self.color_at(cell);
        self.black.reset(cell);
        self.white.reset(cell);
        self.played.reset(cell);
        self.to_play = color;
        self.check_invariant()
    }

    /// Bulk-replaces the position. `black` and `white` must be disjoint.
    pub fn set_position(&mut self, black: BitSet, white: BitSet, to_play: Color) -> Result<()> {
        if black.intersects(&white) {
            return Err(BenzeneError::bad_input("black and white sets overlap"));
        }
        self.black = black;
        self.white = white;
        self.played = black.union(&white);
        self.to_play = to_play;
        self.check_invariant()
    }

    fn check_invariant(&self) -> Result<()> {
        if self.black.intersects(&self.white) {
            return Err(BenzeneError::invariant(
                "Position::check_invariant",
                "black and white overlap",
            ));
        }
        if self.played != self.black.union(&self.white) {
            return Err(BenzeneError::invariant(
                "Position::check_invariant",
                "played != black union white",
            ));
        }
        Ok(())
    }

    /// A 64-bit Zobrist-style hash, stable across runs for equal contents.
    /// Used only as an external cache key; the core itself never caches on
    /// hash and always falls back to exact equality.
    pub fn position_hash(&self) -> u64 {
        let table = zobrist_table();
        let mut h = 0u64;
        for c in self.black.iter() {
            h ^= table[c as usize][0];
        }
        for c in self.white.iter() {
            h ^= table[c as usize][1];
        }
        if self.to_play == Color::White {
            h ^= TO_PLAY_KEY;
        }
        h
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new_board()
    }
}

const TO_PLAY_KEY: u64 = 0x9E3779B97F4A7C15;

/// Deterministic splitmix64 stream; avoids pulling in a full RNG crate for
/// a one-time constant table, and guarantees the same hash across runs
/// regardless of platform RNG seeding.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn zobrist_table() -> &'static Vec<[u64; 2]> {
    static TABLE: OnceLock<Vec<[u64; 2]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut state = 0xDEAD_BEEF_CAFE_F00Du64;
        (0..crate::constants::NUM_CELLS)
            .map(|_| [splitmix64(&mut state), splitmix64(&mut state)])
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_at;

    #[test]
    fn play_then_undo_restores_state() {
        let mut pos = Position::new_board();
        let c = cell_at(0, 0);
        pos.play(Color::Black, c).unwrap();
        assert_eq!(pos.color_at(c), Color::Black);
        pos.undo(c).unwrap();
        assert_eq!(pos.color_at(c), Color::Empty);
        assert_eq!(pos, Position::new_board());
    }

    #[test]
    fn played_equals_union() {
        let mut pos = Position::new_board();
        pos.play(Color::Black, cell_at(1, 1)).unwrap();
        pos.play(Color::White, cell_at(2, 2)).unwrap();
        assert_eq!(*pos.played(), pos.black().union(pos.white()));
    }

    #[test]
    fn hash_is_stable_and_order_independent() {
        let mut a = Position::new_board();
        a.play(Color::Black, cell_at(0, 0)).unwrap();
        a.play(Color::White, cell_at(1, 0)).unwrap();

        let mut b = Position::new_board();
        // same stones, constructed via bulk replace instead of play/play
        let mut black = BitSet::new();
        black.set(cell_at(0, 0));
        let mut white = BitSet::new();
        white.set(cell_at(1, 0));
        b.set_position(black, white, a.to_play()).unwrap();

        assert_eq!(a.position_hash(), b.position_hash());
    }

    #[test]
    fn overlapping_sets_rejected() {
        let mut pos = Position::new_board();
        let mut black = BitSet::new();
        black.set(cell_at(0, 0));
        let mut white = BitSet::new();
        white.set(cell_at(0, 0));
        assert!(pos.set_position(black, white, Color::Black).is_err());
    }
}
