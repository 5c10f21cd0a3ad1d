//! Combinatorial decomposition: finds empty regions that split the board
//! into parts only reachable through a small cut set, so a search can
//! solve each part independently.

use crate::bitset::BitSet;
use crate::cell::{self, Cell, Color};
use crate::groups::Groups;
use crate::position::Position;
use crate::vc::Kind;
use crate::vc_store::VcStore;
use std::collections::VecDeque;

/// A maximal empty region bordered entirely by one colour's stones (and
/// at most that colour's edges), found by flooding through empty cells
/// only.
#[derive(Clone, Debug)]
pub struct Region {
    pub cells: BitSet,
    pub border: BitSet,
}

/// An articulation carrier: playing every cell of `carrier` for `color`
/// would certainly connect `left` to `right`, and no stone of `color`
/// currently reaches through any other empty cell, so the position
/// decomposes into two independent sub-problems joined only by `carrier`.
#[derive(Clone, Debug)]
pub struct Decomposition {
    pub color: Color,
    pub left: Cell,
    pub right: Cell,
    pub carrier: BitSet,
}

/// Finds every maximal connected empty region and the set of stones (plus
/// edges) bordering it.
pub fn find_regions(pos: &Position) -> Vec<Region> {
    let mut visited = BitSet::new();
    let mut regions = Vec::new();

    for start in cell::interior_cells() {
        if visited.test(start) || pos.color_at(start) != Color::Empty {
            continue;
        }
        let mut cells = BitSet::new();
        let mut border = BitSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.set(start);

        while let Some(c) = queue.pop_front() {
            cells.set(c);
            for n in cell::neighbors(c) {
                let is_empty = cell::is_interior(n) && pos.color_at(n) == Color::Empty;
                if is_empty {
                    if !visited.test(n) {
                        visited.set(n);
                        queue.push_back(n);
                    }
                } else {
                    border.set(n);
                }
            }
        }
        regions.push(Region { cells, border });
    }
    regions
}

/// Looks for a splitting decomposition around a single empty region: the
/// region's border touches exactly two of `color`'s groups (or edges) and
/// no others, meaning every path through this region necessarily passes
/// between just those two, via a carrier no larger than the region
/// itself. The region shape alone isn't sufficient — `store` must also
/// hold at least one stored FULL connection between the two bordering
/// groups whose carrier stays inside the region, or the "decomposition"
/// isn't actually realisable and reporting it would mislead a search
/// into treating the two sides as already joined.
pub fn find_decompositions(
    pos: &Position,
    groups: &Groups,
    color: Color,
    store: &VcStore,
) -> Vec<Decomposition> {
    let mut out = Vec::new();
    for region in find_regions(pos) {
        let captains: Vec<Cell> = region
            .border
            .iter()
            .filter(|&c| {
                if cell::is_edge(c) {
                    cell::edge_owner(c) == color
                } else {
                    pos.color_at(c) == color
                }
            })
            .map(|c| groups.captain_of(c))
            .collect();
        let mut unique = captains.clone();
        unique.sort_unstable();
        unique.dedup();

        let other_color_touches = region.border.iter().any(|c| {
            if cell::is_edge(c) {
                cell::edge_owner(c) != color
            } else {
                pos.color_at(c) == color.opponent()
            }
        });

        if unique.len() != 2 || other_color_touches {
            continue;
        }

        let (left, right) = (unique[0], unique[1]);
        let Some(fulls) = store.get(Kind::Full, left, right) else {
            continue;
        };
        let sound = fulls.iter().any(|vc| vc.carrier().is_subset_of(&region.cells));
        if !sound {
            continue;
        }

        out.push(Decomposition { color, left, right, carrier: region.cells });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_at;

    #[test]
    fn empty_board_is_one_region() {
        let pos = Position::new_board();
        let regions = find_regions(&pos);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].cells.count() as usize, crate::constants::NUM_INTERIOR);
    }

    #[test]
    fn wall_splits_board_into_two_regions() {
        let mut pos = Position::new_board();
        let (_, height) = (crate::constants::WIDTH, crate::constants::HEIGHT);
        let row = height / 2;
        for col in 0..crate::constants::WIDTH {
            pos.play(Color::Black, cell_at(col, row)).unwrap();
        }
        let regions = find_regions(&pos);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn decomposition_requires_exactly_two_bordering_groups() {
        let mut pos = Position::new_board();
        let (_, height) = (crate::constants::WIDTH, crate::constants::HEIGHT);
        let row = height / 2;
        for col in 0..crate::constants::WIDTH {
            pos.play(Color::Black, cell_at(col, row)).unwrap();
        }
        let groups = Groups::build(&pos);
        let builder = crate::vc_builder::VcBuilder::new(Default::default());
        let (store, _) = builder.build_from_scratch(&pos, &groups, Color::White);
        let decomps = find_decompositions(&pos, &groups, Color::White, &store);
        // The black wall borders both halves only with White's own edges
        // plus the wall itself (a black group, not white) — so from
        // White's perspective each half is bordered by exactly its two
        // side edges (EAST/WEST), which is the splitting shape.
        assert!(decomps.iter().all(|d| d.left != d.right));
    }
}
