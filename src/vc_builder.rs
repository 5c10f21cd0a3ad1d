//! The virtual-connection engine: builds FULL/SEMI connections between
//! every pair of friendly groups and keeps them consistent as the board
//! changes.
//!
//! The closure runs in three stages, same order as the base-VC /
//! pattern-VC / AND-OR-fixpoint structure this engine descends from:
//! base connections from raw adjacency, then a fixed point of AND/OR
//! combination until no pair changes, with incremental builds replaying
//! only the groups touched by the last move.

use crate::bitset::BitSet;
use crate::cell::{self, Cell, Color};
use crate::changelog::ChangeLog;
use crate::groups::Groups;
use crate::patterns::{self, Verdict};
use crate::position::Position;
use crate::stats::BuildStatistics;
use crate::vc::{Kind, Rule, Vc};
use crate::vc_store::VcStore;
use std::collections::HashMap;

/// Tunables for a build, defaults mirroring the engine this one
/// descends from.
#[derive(Copy, Clone, Debug)]
pub struct BuilderParams {
    pub and_over_edge: bool,
    pub use_patterns: bool,
    pub use_non_edge_patterns: bool,
    pub use_greedy_union: bool,
    pub abort_on_winning_connection: bool,
    pub incremental_builds: bool,
    pub threats: bool,
    pub max_ors: usize,
}

impl Default for BuilderParams {
    fn default() -> Self {
        BuilderParams {
            and_over_edge: false,
            use_patterns: true,
            use_non_edge_patterns: true,
            use_greedy_union: true,
            abort_on_winning_connection: false,
            incremental_builds: true,
            threats: false,
            max_ors: 4,
        }
    }
}

pub struct VcBuilder {
    pub params: BuilderParams,
}

impl VcBuilder {
    pub fn new(params: BuilderParams) -> Self {
        VcBuilder { params }
    }

    /// Builds every FULL/SEMI connection between `color`'s groups from
    /// nothing but the current position.
    pub fn build_from_scratch(&self, pos: &Position, groups: &Groups, color: Color) -> (VcStore, BuildStatistics) {
        log::debug!("build_from_scratch({color:?}): start");
        let mut store = VcStore::new();
        let mut stats = BuildStatistics::new();
        self.add_adjacency_vcs(pos, groups, color, &mut store, &mut stats, None);
        self.add_base_vcs(pos, groups, color, &mut store, &mut stats, None);
        if self.params.use_patterns {
            self.add_pattern_vcs(pos, groups, color, &mut store, &mut stats, None);
        }
        self.close_fixed_point(pos, &mut store, groups, color, &mut stats, None);
        log::debug!("build_from_scratch({color:?}): done, {stats}");
        (store, stats)
    }

    /// Rebuilds only the connections touching `changed` captains, replaying
    /// undo information onto `log` so [`Self::revert`] can unwind it later.
    /// Falls back to a from-scratch rebuild when `incremental_builds` is
    /// off, which by construction agrees with the incremental result.
    pub fn build_incremental(
        &self,
        store: &mut VcStore,
        pos: &Position,
        groups: &Groups,
        color: Color,
        changed: &[Cell],
        log: &mut ChangeLog<Vc>,
    ) -> BuildStatistics {
        let mut stats = BuildStatistics::new();
        if !self.params.incremental_builds {
            log::trace!("build_incremental({color:?}): incremental_builds off, rebuilding from scratch");
            let (fresh, s) = self.build_from_scratch(pos, groups, color);
            *store = fresh;
            return s;
        }
        log::trace!("build_incremental({color:?}): {} captain(s) touched", changed.len());
        log.push_marker();
        let mut log = Some(log);
        for &z in changed {
            store.remove_incident(z, log.as_deref_mut());
        }
        self.add_adjacency_vcs(pos, groups, color, store, &mut stats, log.as_deref_mut());
        self.add_base_vcs(pos, groups, color, store, &mut stats, log.as_deref_mut());
        if self.params.use_patterns {
            self.add_pattern_vcs(pos, groups, color, store, &mut stats, log.as_deref_mut());
        }
        self.close_fixed_point(pos, store, groups, color, &mut stats, log.as_deref_mut());
        log::trace!("build_incremental({color:?}): done, {stats}");
        stats
    }

    /// Undoes the most recent [`Self::build_incremental`] scope: every
    /// `Add` entry is removed again, every `Remove` entry is force-restored
    /// exactly as it was (bypassing the superset filter, since it was valid
    /// before whatever superset would otherwise reject it).
    pub fn revert(&self, store: &mut VcStore, log: &mut ChangeLog<Vc>) {
        let mut to_remove: Vec<Vc> = Vec::new();
        let mut to_restore: Vec<Vc> = Vec::new();
        log.revert(
            |vc| to_remove.push(*vc),
            |vc| to_restore.push(*vc),
            |_vc| {},
        );
        log::trace!("revert: undoing {} add(s), {} removal(s)", to_remove.len(), to_restore.len());
        for vc in to_remove {
            store.remove(&vc, None);
        }
        for vc in to_restore {
            store.force_restore(vc);
        }
    }

    /// Deterministically recomputes threat connections: AND combinations
    /// routed through an edge captain, found even when `and_over_edge` is
    /// off since an edge threatening a second connection matters regardless
    /// of whether the main search ANDs over it. Always a pure function of
    /// `store`/`groups` — callers must not persist the result across
    /// builds, which is what keeps repeated incremental builds idempotent.
    pub fn compute_threats(&self, store: &VcStore, groups: &Groups, color: Color) -> Vec<Vc> {
        if !self.params.threats {
            return Vec::new();
        }
        let mut out = Vec::new();
        let captains = friendly_captains(groups, color);
        for &z in &captains {
            if !cell::is_edge(z) {
                continue;
            }
            let incident = incident_pairs(store, z);
            for i in 0..incident.len() {
                for j in (i + 1)..incident.len() {
                    let (other1, vc1) = incident[i];
                    let (other2, vc2) = incident[j];
                    if other1 == other2 {
                        continue;
                    }
                    if let Some(vc) = combine_through(other1, other2, &vc1, &vc2, color, z, &BitSet::new()) {
                        out.push(vc);
                    }
                }
            }
        }
        out
    }

    /// Literal adjacency VCs: every friendly-or-empty group's captain to
    /// each empty cell touching it, with an empty carrier (the pair is
    /// already as connected as an empty cell allows). The base layer every
    /// other VC in the store is eventually built out of.
    fn add_adjacency_vcs(
        &self,
        pos: &Position,
        groups: &Groups,
        color: Color,
        store: &mut VcStore,
        stats: &mut BuildStatistics,
        mut log: Option<&mut ChangeLog<Vc>>,
    ) {
        for g in groups.iter_colors(&[color, Color::Empty]) {
            for n in g.neighbors.iter() {
                if n == g.captain || !cell::is_interior(n) || pos.color_at(n) != Color::Empty {
                    continue;
                }
                stats.base_vcs += 1;
                store.add(Vc::full(g.captain, n, BitSet::new(), Rule::Base), log.as_deref_mut());
            }
        }
    }

    /// Pattern-derived VCs: an empty cell classified as captured for
    /// `color` connects its neighbouring friendly-or-empty captains for
    /// free, without needing the AND rule to discover it. Gated the same
    /// way base adjacency VCs would be by `use_non_edge_patterns` — edge
    /// captains are cheap to pattern-match so they're never skipped.
    fn add_pattern_vcs(
        &self,
        pos: &Position,
        groups: &Groups,
        color: Color,
        store: &mut VcStore,
        stats: &mut BuildStatistics,
        mut log: Option<&mut ChangeLog<Vc>>,
    ) {
        for g in groups.iter_colors(&[color, Color::Empty]) {
            if !self.params.use_non_edge_patterns && !cell::is_edge(g.captain) {
                continue;
            }
            for n in g.neighbors.iter() {
                if n == g.captain || !cell::is_interior(n) || pos.color_at(n) != Color::Empty {
                    continue;
                }
                if !matches!(patterns::classify(pos, color, n), Some(Verdict::Captured(c)) if c == color) {
                    continue;
                }
                if store.add(Vc::full(g.captain, n, BitSet::new(), Rule::Base), log.as_deref_mut()) {
                    stats.pattern_vcs += 1;
                }
            }
        }
    }

    fn add_base_vcs(
        &self,
        pos: &Position,
        groups: &Groups,
        color: Color,
        store: &mut VcStore,
        stats: &mut BuildStatistics,
        mut log: Option<&mut ChangeLog<Vc>>,
    ) {
        let captains = friendly_and_empty_captains(groups, color);
        for i in 0..captains.len() {
            for j in (i + 1)..captains.len() {
                let a = captains[i];
                let b = captains[j];
                let g1 = groups.get(a).unwrap();
                let g2 = groups.get(b).unwrap();
                let common = g1.neighbors.intersection(&g2.neighbors);
                let empties: Vec<Cell> = common
                    .iter()
                    .filter(|&c| cell::is_interior(c) && pos.color_at(c) == Color::Empty)
                    .collect();

                if empties.is_empty() {
                    continue;
                }

                if empties.len() == 1 {
                    let mut carrier = BitSet::new();
                    carrier.set(empties[0]);
                    if store.add(Vc::semi(a, b, empties[0], carrier, Rule::Base), log.as_deref_mut()) {
                        stats.base_vcs += 1;
                    }
                    continue;
                }

                // The bridge: any two of several shared empty neighbours
                // already guarantee the connection, since the opponent can
                // only occupy one of them per move.
                for x in 0..empties.len() {
                    for y in (x + 1)..empties.len() {
                        let mut carrier = BitSet::new();
                        carrier.set(empties[x]);
                        carrier.set(empties[y]);
                        if store.add(Vc::full(a, b, carrier, Rule::Base), log.as_deref_mut()) {
                            stats.base_vcs += 1;
                        }
                    }
                }
                for &e in &empties {
                    let mut carrier = BitSet::new();
                    carrier.set(e);
                    store.add(Vc::semi(a, b, e, carrier, Rule::Base), log.as_deref_mut());
                }
            }
        }
    }

    fn close_fixed_point(
        &self,
        pos: &Position,
        store: &mut VcStore,
        groups: &Groups,
        color: Color,
        stats: &mut BuildStatistics,
        mut log: Option<&mut ChangeLog<Vc>>,
    ) {
        let captains = friendly_and_empty_captains(groups, color);
        let friendly = friendly_captains(groups, color);
        let captured = captured_sets(pos, groups, color);
        const MAX_ITERATIONS: usize = 64;
        log::trace!("close_fixed_point({color:?}): entering, {} captain(s)", captains.len());

        for iteration in 0..MAX_ITERATIONS {
            let mut changed = false;

            // AND rule: combine two connections sharing captain `z`. `z`'s
            // own colour decides the kind of the result — a friendly z
            // merges two connections that are already settled, so the
            // result is FULL; an empty z still needs to be played, so the
            // result is only a SEMI keyed on it.
            for &z in &captains {
                if cell::is_edge(z) && !self.params.and_over_edge {
                    continue;
                }
                let z_color = groups.get(z).map(|g| g.color).unwrap_or(color);
                let z_captured = captured.get(&z).copied().unwrap_or_default();
                let incident = incident_pairs(store, z);
                for i in 0..incident.len() {
                    for j in (i + 1)..incident.len() {
                        let (other1, vc1) = incident[i];
                        let (other2, vc2) = incident[j];
                        if other1 == other2 {
                            continue;
                        }
                        stats.and_attempts += 1;
                        let mut cap = z_captured;
                        cap.union_with(&captured.get(&other1).copied().unwrap_or_default());
                        cap.union_with(&captured.get(&other2).copied().unwrap_or_default());
                        if let Some(vc) = combine_through(other1, other2, &vc1, &vc2, z_color, z, &cap) {
                            stats.and_successes += 1;
                            if store.add(vc, log.as_deref_mut()) {
                                changed = true;
                            }
                        }
                    }
                }
            }

            // OR rule: greedily union disjoint semis sharing an endpoint
            // pair into a full connection. Restricted to friendly captains
            // — the pairs a caller actually queries — since empty groups
            // are only ever meant as AND-rule waypoints.
            for i in 0..friendly.len() {
                for j in (i + 1)..friendly.len() {
                    let a = friendly[i];
                    let b = friendly[j];
                    let Some(list) = store.get(Kind::Semi, a, b) else {
                        continue;
                    };
                    let semis: Vec<Vc> = list.iter().copied().collect();
                    stats.or_attempts += 1;
                    if let Some(full) = greedy_or(&semis, self.params.max_ors) {
                        stats.or_successes += 1;
                        if store.add(full, log.as_deref_mut()) {
                            changed = true;
                        }
                    }
                }
            }

            if self.params.threats {
                for vc in self.compute_threats(store, groups, color) {
                    if store.add(vc, log.as_deref_mut()) {
                        changed = true;
                    }
                }
            }

            if !changed {
                log::trace!("close_fixed_point({color:?}): converged after {} iteration(s)", iteration + 1);
                break;
            }
        }
    }
}

/// Friendly-and-empty group captains: the vertex set the VC graph
/// operates over (never the opponent's, which can't host a connection).
fn friendly_and_empty_captains(groups: &Groups, color: Color) -> Vec<Cell> {
    groups.iter_colors(&[color, Color::Empty]).map(|g| g.captain).collect()
}

/// Just the friendly captains — the endpoints a caller actually queries.
fn friendly_captains(groups: &Groups, color: Color) -> Vec<Cell> {
    groups.iter_colors(&[color]).map(|g| g.captain).collect()
}

/// Cells the opponent gains nothing from playing, from `color`'s point of
/// view, for every friendly-or-empty captain's empty neighbours. Folded
/// into a combined connection's carrier rather than rejecting it outright
/// when two sub-connections' carriers overlap only in cells like these.
fn captured_sets(pos: &Position, groups: &Groups, color: Color) -> HashMap<Cell, BitSet> {
    let mut out = HashMap::new();
    for g in groups.iter_colors(&[color, Color::Empty]) {
        let mut set = BitSet::new();
        for n in g.neighbors.iter() {
            if !cell::is_interior(n) || pos.color_at(n) != Color::Empty {
                continue;
            }
            match patterns::classify(pos, color, n) {
                Some(Verdict::Captured(c)) if c == color => set.set(n),
                Some(Verdict::Dead) => set.set(n),
                _ => {}
            }
        }
        out.insert(g.captain, set);
    }
    out
}

/// Every `(other_endpoint, vc)` pair incident to `z`, across both kinds.
fn incident_pairs(store: &VcStore, z: Cell) -> Vec<(Cell, Vc)> {
    let mut out = Vec::new();
    for kind in [Kind::Full, Kind::Semi] {
        for (&(a, b), list) in store.iter_pairs(kind) {
            if a == z {
                out.extend(list.iter().map(|v| (b, *v)));
            } else if b == z {
                out.extend(list.iter().map(|v| (a, *v)));
            }
        }
    }
    out
}

/// Combines `vc1` (between `x1` and the shared captain `z`) and `vc2`
/// (between `z` and `x2`) into a connection between `x1` and `x2`. `z`'s
/// colour decides FULL vs SEMI: a friendly `z` is already a settled
/// stone, so two FULLs through it combine into a FULL (and a FULL+SEMI or
/// matching-key SEMI+SEMI combine the same way they always have); an
/// empty `z` still has to be played, so only two FULLs through it combine,
/// and only into a SEMI keyed on `z`. Carriers that overlap only in
/// `captured` (cells neither side can profitably contest) still combine,
/// with `captured` folded into the result the same way the original
/// carrier union is.
fn combine_through(
    x1: Cell,
    x2: Cell,
    vc1: &Vc,
    vc2: &Vc,
    z_color: Color,
    z: Cell,
    captured: &BitSet,
) -> Option<Vc> {
    let overlap = vc1.carrier().intersection(&vc2.carrier());
    if overlap.any() && !overlap.is_subset_of(captured) {
        return None;
    }
    let cap = if overlap.any() { Some(*captured) } else { None };

    if z_color == Color::Empty {
        return match (vc1.kind(), vc2.kind()) {
            (Kind::Full, Kind::Full) => Some(Vc::and_vcs_semi(x1, x2, vc1, vc2, cap, z)),
            _ => None,
        };
    }

    match (vc1.kind(), vc2.kind()) {
        (Kind::Full, Kind::Full) => Some(Vc::and_vcs(x1, x2, vc1, vc2, cap)),
        (Kind::Full, Kind::Semi) => Some(Vc::and_vcs_semi(x1, x2, vc1, vc2, cap, vc2.key())),
        (Kind::Semi, Kind::Full) => Some(Vc::and_vcs_semi(x1, x2, vc1, vc2, cap, vc1.key())),
        (Kind::Semi, Kind::Semi) => {
            if vc1.key() == vc2.key() {
                Some(Vc::and_vcs(x1, x2, vc1, vc2, cap))
            } else {
                None
            }
        }
    }
}

/// Greedily picks up to `max_ors` semis whose carriers (key included) are
/// pairwise disjoint and unions them into a FULL. Sound but not
/// exhaustive: a true combination can exist that this miss.
fn greedy_or(semis: &[Vc], max_ors: usize) -> Option<Vc> {
    if semis.len() < 2 {
        return None;
    }
    let mut ordered: Vec<&Vc> = semis.iter().collect();
    ordered.sort_by_key(|v| v.count());

    let mut chosen: Vec<&Vc> = Vec::new();
    let mut used = BitSet::new();
    for v in ordered {
        if chosen.len() >= max_ors {
            break;
        }
        if !used.intersects(&v.carrier()) {
            used.union_with(&v.carrier());
            chosen.push(v);
        }
    }
    if chosen.len() < 2 {
        return None;
    }
    let (x, y) = (chosen[0].x(), chosen[0].y());
    let mut carrier = BitSet::new();
    for v in &chosen {
        carrier.union_with(&v.carrier());
    }
    Some(Vc::full(x, y, carrier, Rule::Or))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_at;

    #[test]
    fn bridge_produces_full_connection() {
        let mut pos = Position::new_board();
        pos.play(Color::Black, cell_at(4, 4)).unwrap();
        pos.play(Color::White, cell_at(0, 0)).unwrap();
        pos.play(Color::Black, cell_at(5, 3)).unwrap();
        let groups = Groups::build(&pos);
        let builder = VcBuilder::new(BuilderParams::default());
        let (store, stats) = builder.build_from_scratch(&pos, &groups, Color::Black);
        assert!(stats.base_vcs > 0);
        let a = groups.captain_of(cell_at(4, 4));
        let b = groups.captain_of(cell_at(5, 3));
        let full = store.get(Kind::Full, a, b);
        assert!(full.is_some_and(|l| !l.is_empty()));
    }

    #[test]
    fn single_shared_neighbor_is_only_semi() {
        let mut pos = Position::new_board();
        pos.play(Color::Black, cell_at(4, 4)).unwrap();
        pos.play(Color::Black, cell_at(6, 3)).unwrap();
        let groups = Groups::build(&pos);
        let builder = VcBuilder::new(BuilderParams::default());
        let (store, _stats) = builder.build_from_scratch(&pos, &groups, Color::Black);
        let a = groups.captain_of(cell_at(4, 4));
        let b = groups.captain_of(cell_at(6, 3));
        let common_empty_neighbors = groups
            .get(a)
            .unwrap()
            .neighbors
            .intersection(&groups.get(b).unwrap().neighbors)
            .iter()
            .filter(|&c| pos.color_at(c) == Color::Empty)
            .count();
        if common_empty_neighbors == 1 {
            assert!(store.get(Kind::Full, a, b).is_none());
            assert!(store.get(Kind::Semi, a, b).is_some());
        }
    }

    #[test]
    fn edge_groups_connect_black_top_to_bottom_eventually_via_closure() {
        let pos = Position::new_board();
        let groups = Groups::build(&pos);
        let builder = VcBuilder::new(BuilderParams::default());
        let (store, _stats) = builder.build_from_scratch(&pos, &groups, Color::Black);
        // On an empty board north/south aren't adjacent, so no direct pair
        // exists yet; just confirm the build terminates and produces some
        // base connections among edge-adjacent empties.
        assert!(store.len(Kind::Semi) > 0 || store.len(Kind::Full) > 0);
    }
}
