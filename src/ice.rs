//! Inferior Cell Engine: deduces empty cells whose assignment is already
//! settled (dead, captured) or whose value is dominated by some other
//! cell, so the VC engine and any consumer searching on top of it can
//! treat them as already decided without losing soundness.

use crate::bitset::BitSet;
use crate::cell::{self, Cell, Color};
use crate::patterns::{self, Verdict};
use crate::position::Position;
use std::collections::HashMap;

/// Fill-in deductions for a single position, independent of colour to
/// move: `dead` cells never matter to either player; `captured` cells are
/// settled in favour of one colour.
#[derive(Clone, Debug, Default)]
pub struct FillIn {
    pub dead: BitSet,
    pub captured_black: BitSet,
    pub captured_white: BitSet,
}

impl FillIn {
    pub fn is_settled(&self, c: Cell) -> bool {
        self.dead.test(c) || self.captured_black.test(c) || self.captured_white.test(c)
    }

    /// Every settled cell, regardless of which way it was settled —
    /// carriers can drop these unconditionally.
    pub fn settled(&self) -> BitSet {
        self.dead.union(&self.captured_black).union(&self.captured_white)
    }
}

/// Runs pattern-based dead/captured deduction over every empty interior
/// cell. Checked from both colours' perspective since a cell can be dead
/// (irrelevant to both) or captured by either one.
pub fn compute_fillin(pos: &Position) -> FillIn {
    let mut out = FillIn::default();
    for c in cell::interior_cells() {
        if pos.color_at(c) != Color::Empty {
            continue;
        }
        match patterns::classify(pos, Color::Black, c) {
            Some(Verdict::Dead) => out.dead.set(c),
            Some(Verdict::Captured(Color::Black)) => out.captured_black.set(c),
            Some(Verdict::Captured(Color::White)) => out.captured_white.set(c),
            _ => {
                if let Some(Verdict::Dead) = patterns::classify(pos, Color::White, c) {
                    out.dead.set(c);
                }
            }
        }
    }
    out
}

/// A "presimplicial pair": `cell` is not yet captured, but becomes
/// captured for `color` the moment the opponent plays `trigger`. Useful as
/// a cheap one-ply lookahead without a full search. `carrier` is the set
/// of cells that must stay empty for the threat to remain live — the
/// same cells the eventual capture pattern will match against, so a
/// search can tell whether some other move has already defused it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VulnerablePair {
    pub cell: Cell,
    pub trigger: Cell,
    pub color: Color,
    pub carrier: BitSet,
}

/// The empty interior neighbours of `c` in `pos` — the cells a capture
/// pattern centred on `c` still depends on.
fn empty_neighbor_carrier(pos: &Position, c: Cell) -> BitSet {
    let mut bs = BitSet::new();
    for n in cell::neighbors(c) {
        if cell::is_interior(n) && pos.color_at(n) == Color::Empty {
            bs.set(n);
        }
    }
    bs
}

/// Finds every [`VulnerablePair`] by trying each empty neighbour of each
/// empty cell as a hypothetical opponent move and re-running pattern
/// classification. O(empty cells × neighbours), each doing a cheap local
/// check, so this stays fast even though it's not incremental.
pub fn vulnerable_cells(pos: &Position, color: Color) -> Vec<VulnerablePair> {
    let mut out = Vec::new();
    for e in cell::interior_cells() {
        if pos.color_at(e) != Color::Empty {
            continue;
        }
        if patterns::classify(pos, color, e).is_some() {
            continue;
        }
        for n in cell::neighbors(e) {
            if !cell::is_interior(n) || pos.color_at(n) != Color::Empty {
                continue;
            }
            let mut trial = pos.clone();
            if trial.play(color.opponent(), n).is_err() {
                continue;
            }
            if let Some(Verdict::Captured(c)) = patterns::classify(&trial, color, e) {
                if c == color {
                    let carrier = empty_neighbor_carrier(&trial, e);
                    out.push(VulnerablePair { cell: e, trigger: n, color, carrier });
                }
            }
        }
    }
    out
}

/// Two cells that each kill the other — `x` becomes captured once `y` is
/// played and vice versa — with disjoint carriers, are a presimplicial
/// pair: filling both, plus their combined carrier, in favour of `color`
/// cannot change the outcome, since whichever one the opponent plays
/// first immediately captures the other.
pub fn find_presimplicial_pairs(pos: &Position, color: Color) -> BitSet {
    let pairs = vulnerable_cells(pos, color);
    let mut fillin = BitSet::new();

    for p1 in &pairs {
        if fillin.test(p1.cell) || fillin.test(p1.trigger) {
            continue;
        }
        if p1.carrier.intersects(&fillin) {
            continue;
        }
        let mutual = pairs
            .iter()
            .find(|p2| p2.cell == p1.trigger && p2.trigger == p1.cell && !fillin.test(p2.cell));
        let Some(p2) = mutual else { continue };
        if p2.carrier.intersects(&fillin) {
            continue;
        }
        if p1.carrier.intersects(&p2.carrier) {
            continue;
        }
        let both = p1.carrier.union(&p2.carrier);
        if both.intersects(&fillin) {
            continue;
        }
        fillin.union_with(&both);
        fillin.set(p1.cell);
        fillin.set(p1.trigger);
    }

    fillin
}

/// `c1` is dominated by `c2` (for `color`) when every empty neighbour of
/// `c1` not also playable by the opponent is also a neighbour of `c2`: any
/// connection `c1` could extend, `c2` extends at least as well, so a
/// search can always prefer `c2`.
pub fn dominated_by(pos: &Position, c1: Cell, c2: Cell) -> bool {
    if c1 == c2 || pos.color_at(c1) != Color::Empty || pos.color_at(c2) != Color::Empty {
        return false;
    }
    let n1: BitSet = {
        let mut bs = BitSet::new();
        for n in cell::neighbors(c1) {
            bs.set(n);
        }
        bs
    };
    let n2: BitSet = {
        let mut bs = BitSet::new();
        for n in cell::neighbors(c2) {
            bs.set(n);
        }
        bs
    };
    n1.is_subset_of(&n2)
}

/// Finds the strongly connected components of the domination graph over
/// every empty cell (an edge `c1 -> c2` when `c1` is dominated by `c2`),
/// via Tarjan's algorithm, iteratively to avoid overflowing the stack on
/// a full board of empty cells.
fn strongly_connected_components(vertices: &[Cell], edges: &HashMap<Cell, Vec<Cell>>) -> Vec<Vec<Cell>> {
    let mut index_of: HashMap<Cell, usize> = HashMap::new();
    let mut lowlink: HashMap<Cell, usize> = HashMap::new();
    let mut on_stack: HashMap<Cell, bool> = HashMap::new();
    let mut stack: Vec<Cell> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    for &root in vertices {
        if index_of.contains_key(&root) {
            continue;
        }

        // (vertex, next edge to explore) frames, depth-first.
        let mut work: Vec<(Cell, usize)> = vec![(root, 0)];
        index_of.insert(root, next_index);
        lowlink.insert(root, next_index);
        next_index += 1;
        stack.push(root);
        on_stack.insert(root, true);

        while let Some(&(v, i)) = work.last() {
            let neighbours = edges.get(&v).map(Vec::as_slice).unwrap_or(&[]);
            if i < neighbours.len() {
                let w = neighbours[i];
                work.last_mut().unwrap().1 += 1;
                if !index_of.contains_key(&w) {
                    index_of.insert(w, next_index);
                    lowlink.insert(w, next_index);
                    next_index += 1;
                    stack.push(w);
                    on_stack.insert(w, true);
                    work.push((w, 0));
                } else if *on_stack.get(&w).unwrap_or(&false) {
                    let wi = index_of[&w];
                    let vl = lowlink[&v];
                    lowlink.insert(v, vl.min(wi));
                }
            } else {
                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    let vl = lowlink[&v];
                    let pl = lowlink[&parent];
                    lowlink.insert(parent, pl.min(vl));
                }
                if lowlink[&v] == index_of[&v] {
                    let mut comp = Vec::new();
                    loop {
                        let w = stack.pop().unwrap();
                        on_stack.insert(w, false);
                        comp.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(comp);
                }
            }
        }
    }

    components
}

/// The set of empty cells safe to ignore because some other empty cell
/// dominates them: every vertex of the domination graph except one
/// representative ("captain") per sink strongly-connected component.
/// Sinks — components with no outgoing edge to a different component —
/// are exactly the cells nothing else can substitute for, so every other
/// vertex can be dropped in favour of a path through its component's
/// sink.
pub fn dominated_cells(pos: &Position, color: Color) -> BitSet {
    let empties: Vec<Cell> = cell::interior_cells().filter(|&c| pos.color_at(c) == Color::Empty).collect();

    let mut edges: HashMap<Cell, Vec<Cell>> = HashMap::new();
    for &c1 in &empties {
        for &c2 in &empties {
            if c1 != c2 && dominated_by(pos, c1, c2) {
                edges.entry(c1).or_default().push(c2);
            }
        }
    }

    let components = strongly_connected_components(&empties, &edges);
    let mut comp_of: HashMap<Cell, usize> = HashMap::new();
    for (i, comp) in components.iter().enumerate() {
        for &c in comp {
            comp_of.insert(c, i);
        }
    }

    let mut captains = BitSet::new();
    for (i, comp) in components.iter().enumerate() {
        let is_sink = comp.iter().all(|c| {
            edges.get(c).into_iter().flatten().all(|d| comp_of[d] == i)
        });
        if is_sink {
            captains.set(comp[0]);
        }
    }

    let mut all = BitSet::new();
    for &c in &empties {
        all.set(c);
    }
    all.difference(&captains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_at;

    #[test]
    fn surrounded_cell_is_captured() {
        let mut pos = Position::new_board();
        let center = cell_at(5, 5);
        for n in cell::neighbors(center) {
            if cell::is_interior(n) {
                pos.play(Color::White, n).unwrap();
            }
        }
        let fillin = compute_fillin(&pos);
        assert!(fillin.captured_white.test(center));
        assert!(!fillin.is_settled(cell_at(0, 0)));
    }

    #[test]
    fn a_cell_never_dominates_itself() {
        let pos = Position::new_board();
        let a = cell_at(3, 3);
        assert!(!dominated_by(&pos, a, a));
    }

    #[test]
    fn occupied_cells_never_dominate_or_get_dominated() {
        let mut pos = Position::new_board();
        let a = cell_at(2, 2);
        let b = cell_at(2, 3);
        pos.play(Color::Black, a).unwrap();
        assert!(!dominated_by(&pos, a, b));
        assert!(!dominated_by(&pos, b, a));
    }

    #[test]
    fn empty_board_has_no_vulnerable_cells() {
        let pos = Position::new_board();
        let pairs = vulnerable_cells(&pos, Color::Black);
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_board_has_no_presimplicial_pairs() {
        let pos = Position::new_board();
        assert!(find_presimplicial_pairs(&pos, Color::Black).none());
    }

    #[test]
    fn dominated_cells_never_claims_every_empty_cell() {
        // Every sink strongly connected component of the domination graph
        // keeps one representative, so the dominated set is always a
        // proper subset of the empty cells, no matter the board shape.
        let pos = Position::new_board();
        let dominated = dominated_cells(&pos, Color::Black);
        assert!(dominated.count() < crate::constants::NUM_INTERIOR as u32);
    }
}
