//! The trait seam a search consumes, generalised from the engine's former
//! inheritance-based move generator into ordinary dynamic dispatch.

use crate::cell::{Cell, Color};
use crate::error::Result;

/// A position a search can evaluate and step through. Implemented by
/// [`crate::engine::VcEngine`]; any alternative state representation a
/// search wants to plug in only needs to satisfy this.
pub trait GameState {
    /// A search-friendly score from `color`'s perspective: positive means
    /// `color` is ahead. Implementations are free to use connection
    /// strength, a static heuristic, or a terminal win/loss value.
    fn evaluate(&self, color: Color) -> i32;

    /// Legal moves worth considering from the current position, already
    /// filtered of cells fill-in has settled.
    fn generate_moves(&self, color: Color) -> Vec<Cell>;

    /// Plays `cell` for `color`, updating every derived structure.
    fn execute_move(&mut self, color: Color, cell: Cell) -> Result<()>;

    /// Undoes the most recent [`Self::execute_move`].
    fn undo_move(&mut self) -> Result<()>;

    /// True once either colour has completed a connection across its pair
    /// of edges.
    fn is_terminal(&self) -> bool;

    /// The winning colour, if [`Self::is_terminal`] holds.
    fn winner(&self) -> Option<Color>;
}
