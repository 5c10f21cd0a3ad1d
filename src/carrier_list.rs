//! Sorted carrier list: per-(endpoint pair) storage of VCs of one kind
//! (FULL or SEMI), maintaining the "no stored carrier is a strict superset
//! of another" invariant and caching a soft/hard intersection split.

use crate::bitset::BitSet;
use crate::cell::Cell;
use crate::changelog::{Action, ChangeLog};
use crate::vc::Vc;

/// Outcome of [`VcList::add`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddResult {
    Failed,
    AddedInsideSoftLimit,
    AddedInsideHardLimit,
}

/// Sorted list of VCs between a fixed endpoint pair.
///
/// Entries before `soft_limit` participate in AND/OR combination work;
/// entries at or beyond it are retained (they may later be promoted when a
/// combination-eligible entry is removed) but not combined. This mirrors
/// the soft/hard split of the original engine's connection lists.
#[derive(Clone, Debug)]
pub struct VcList {
    x: Cell,
    y: Cell,
    vcs: Vec<Vc>,
    soft_limit: usize,
    dirty_intersection: bool,
    soft_intersection: BitSet,
    hard_intersection: BitSet,
    dirty_union: bool,
    union: BitSet,
    greedy_union: BitSet,
}

fn all_set() -> BitSet {
    let mut bs = BitSet::new();
    bs.flip_all();
    bs
}

impl VcList {
    pub fn new(x: Cell, y: Cell, soft_limit: usize) -> Self {
        VcList {
            x,
            y,
            vcs: Vec::new(),
            soft_limit,
            dirty_intersection: false,
            soft_intersection: all_set(),
            hard_intersection: all_set(),
            dirty_union: false,
            union: BitSet::new(),
            greedy_union: BitSet::new(),
        }
    }

    pub fn x(&self) -> Cell {
        self.x
    }
    pub fn y(&self) -> Cell {
        self.y
    }
    pub fn len(&self) -> usize {
        self.vcs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vcs.is_empty()
    }
    pub fn soft_limit(&self) -> usize {
        self.soft_limit.min(self.vcs.len())
    }
    pub fn iter(&self) -> impl Iterator<Item = &Vc> {
        self.vcs.iter()
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vc> {
        self.vcs.iter_mut()
    }

    fn dirty_unions(&mut self) {
        self.dirty_union = true;
    }
    fn dirty_ints(&mut self) {
        self.dirty_intersection = true;
    }

    pub fn clear(&mut self) {
        self.vcs.clear();
        self.dirty_unions();
        self.dirty_intersection = false;
        self.soft_intersection = all_set();
        self.hard_intersection = all_set();
    }

    /// True iff some stored carrier is a subset of `c`. Moves the witness
    /// to the front as an MRU hint.
    pub fn superset_of_any(&mut self, c: &BitSet) -> bool {
        if let Some(pos) = self.vcs.iter().position(|v| v.carrier().is_subset_of(c)) {
            if pos != 0 {
                self.vcs.swap(0, pos);
            }
            true
        } else {
            false
        }
    }

    pub fn subset_of_any(&self, c: &BitSet) -> bool {
        self.vcs.iter().any(|v| c.is_subset_of(&v.carrier()))
    }

    /// Removes every carrier that is a strict (or equal) superset of `c`.
    /// Returns the number removed.
    pub fn remove_supersets_of(
        &mut self,
        c: &BitSet,
        log: Option<&mut ChangeLog<Vc>>,
        dirty_intersection: bool,
    ) -> usize {
        let before = self.vcs.len();
        let mut log = log;
        self.vcs.retain(|v| {
            let remove = c.is_subset_of(&v.carrier());
            if remove {
                if let Some(l) = log.as_deref_mut() {
                    l.push(Action::Remove, *v);
                }
            }
            !remove
        });
        let removed = before - self.vcs.len();
        if removed > 0 {
            self.dirty_unions();
            if dirty_intersection {
                self.dirty_ints();
            }
        }
        removed
    }

    /// Inserts `vc`, keeping the list sorted. Fails if some stored carrier
    /// is already a subset of `vc`'s carrier; otherwise removes any stored
    /// supersets first.
    pub fn add(&mut self, vc: Vc, mut log: Option<&mut ChangeLog<Vc>>) -> AddResult {
        if self.subset_of_any(&vc.carrier()) {
            return AddResult::Failed;
        }
        self.remove_supersets_of(&vc.carrier(), log.as_deref_mut(), true);
        let inside_soft = self.vcs.len() < self.soft_limit;
        let pos = self.vcs.partition_point(|existing| existing < &vc);
        self.vcs.insert(pos, vc);
        if let Some(l) = log.as_deref_mut() {
            l.push(Action::Add, vc);
        }
        self.dirty_unions();
        self.dirty_ints();
        if inside_soft {
            AddResult::AddedInsideSoftLimit
        } else {
            AddResult::AddedInsideHardLimit
        }
    }

    /// Bulk-adds every VC of `other` as unprocessed, without checks beyond
    /// sorted insertion (mirrors `VCList::Add(const VCList&, ChangeLog*)`
    /// used during merge to transfer an absorbed group's list).
    pub fn add_list(&mut self, other: &VcList, mut log: Option<&mut ChangeLog<Vc>>) -> usize {
        let mut added = 0;
        for &v in other.vcs.iter() {
            let mut v = v;
            v.set_processed(false);
            let pos = self.vcs.partition_point(|existing| existing < &v);
            self.vcs.insert(pos, v);
            if let Some(l) = log.as_deref_mut() {
                l.push(Action::Add, v);
            }
            added += 1;
        }
        if added > 0 {
            self.dirty_unions();
            self.dirty_ints();
        }
        added
    }

    /// Appends without checks. Caller must have already removed supersets.
    pub fn force_add(&mut self, vc: Vc) {
        let pos = self.vcs.partition_point(|existing| existing < &vc);
        self.vcs.insert(pos, vc);
        self.dirty_unions();
        self.dirty_ints();
    }

    /// Removes every carrier intersecting `mask`, returning the removed
    /// entries in their original relative order so the caller can
    /// reshrink and reinsert them.
    pub fn remove_all_containing(&mut self, mask: &BitSet, mut log: Option<&mut ChangeLog<Vc>>) -> Vec<Vc> {
        let mut removed = Vec::new();
        self.vcs.retain(|v| {
            let hit = v.carrier().intersects(mask);
            if hit {
                if let Some(l) = log.as_deref_mut() {
                    l.push(Action::Remove, *v);
                }
                removed.push(*v);
            }
            !hit
        });
        if !removed.is_empty() {
            self.dirty_unions();
            self.dirty_ints();
        }
        removed
    }

    pub fn remove(&mut self, vc: &Vc, mut log: Option<&mut ChangeLog<Vc>>) -> bool {
        if let Some(pos) = self.vcs.iter().position(|v| v == vc) {
            let removed = self.vcs.remove(pos);
            if let Some(l) = log.as_deref_mut() {
                l.push(Action::Remove, removed);
            }
            self.dirty_unions();
            self.dirty_ints();
            true
        } else {
            false
        }
    }

    /// Force-inserts `vc` back exactly where sorted order puts it, without
    /// the superset filter — used by [`ChangeLog`] replay of a `Remove`.
    pub fn unchecked_restore(&mut self, vc: Vc) {
        self.force_add(vc);
    }

    pub fn union(&mut self) -> BitSet {
        self.recompute_unions_if_dirty();
        self.union
    }

    /// Union of a subset of carriers chosen greedily to keep shrinking a
    /// running intersection; a carrier only contributes if adding it
    /// actually shrinks the intersection-so-far.
    pub fn greedy_union(&mut self) -> BitSet {
        self.recompute_unions_if_dirty();
        self.greedy_union
    }

    fn recompute_unions_if_dirty(&mut self) {
        if !self.dirty_union {
            return;
        }
        let mut union = BitSet::new();
        let mut greedy = BitSet::new();
        let mut running_intersection = all_set();
        for v in self.vcs.iter() {
            union.union_with(&v.carrier());
            let shrunk = running_intersection.intersection(&v.carrier());
            if shrunk != running_intersection {
                running_intersection = shrunk;
                greedy.union_with(&v.carrier());
            }
        }
        self.union = union;
        self.greedy_union = greedy;
        self.dirty_union = false;
    }

    pub fn soft_intersection(&mut self) -> BitSet {
        self.recompute_intersections_if_dirty();
        self.soft_intersection
    }

    pub fn hard_intersection(&mut self) -> BitSet {
        self.recompute_intersections_if_dirty();
        self.hard_intersection
    }

    fn recompute_intersections_if_dirty(&mut self) {
        if !self.dirty_intersection {
            return;
        }
        let mut soft = all_set();
        let mut hard = all_set();
        let soft_limit = self.soft_limit();
        for (i, v) in self.vcs.iter().enumerate() {
            hard.intersect_with(&v.carrier());
            if i < soft_limit {
                soft.intersect_with(&v.carrier());
            }
        }
        self.soft_intersection = soft;
        self.hard_intersection = hard;
        self.dirty_intersection = false;
    }

    pub fn find(&self, vc: &Vc) -> Option<&Vc> {
        self.vcs.iter().find(|v| *v == vc)
    }
}

impl PartialEq for VcList {
    fn eq(&self, other: &Self) -> bool {
        if self.soft_limit != other.soft_limit || self.vcs.len() != other.vcs.len() {
            return false;
        }
        let mut a: Vec<&Vc> = self.vcs.iter().collect();
        let mut b: Vec<&Vc> = other.vcs.iter().collect();
        a.sort();
        b.sort();
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| x == y && x.processed() == y.processed())
    }
}
impl Eq for VcList {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_at;
    use crate::vc::Rule;

    fn carrier(cells: &[Cell]) -> BitSet {
        let mut bs = BitSet::new();
        for &c in cells {
            bs.set(c);
        }
        bs
    }

    #[test]
    fn remove_supersets_of_scenario_s5() {
        let x = cell_at(0, 0);
        let y = cell_at(9, 9);
        let c1 = cell_at(1, 0);
        let c2 = cell_at(2, 0);
        let c3 = cell_at(3, 0);
        let c4 = cell_at(4, 0);
        let mut list = VcList::new(x, y, 10);

        list.force_add(Vc::full(x, y, carrier(&[c1]), Rule::Base));
        list.force_add(Vc::full(x, y, carrier(&[c1, c2]), Rule::Base));
        list.force_add(Vc::full(x, y, carrier(&[c2, c3, c4]), Rule::Base));
        assert_eq!(list.len(), 3);

        let removed = list.remove_supersets_of(&carrier(&[c1]), None, true);
        assert_eq!(removed, 1);
        assert_eq!(list.len(), 2);

        let removed2 = list.remove_all_containing(&carrier(&[c2, crate::cell::NORTH]), None);
        assert_eq!(removed2.len(), 1);
    }

    #[test]
    fn try_add_rejects_superset() {
        let x = cell_at(0, 0);
        let y = cell_at(9, 9);
        let a = cell_at(1, 1);
        let b = cell_at(2, 2);
        let mut list = VcList::new(x, y, 10);
        assert_eq!(list.add(Vc::full(x, y, carrier(&[a]), Rule::Base), None), AddResult::AddedInsideSoftLimit);
        assert_eq!(
            list.add(Vc::full(x, y, carrier(&[a, b]), Rule::Base), None),
            AddResult::Failed
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn superset_of_any_moves_witness_to_front() {
        let x = cell_at(0, 0);
        let y = cell_at(9, 9);
        let a = cell_at(1, 1);
        let b = cell_at(2, 2);
        let mut list = VcList::new(x, y, 10);
        list.force_add(Vc::full(x, y, carrier(&[a, b]), Rule::Base));
        list.force_add(Vc::full(x, y, carrier(&[a]), Rule::Base));
        assert!(list.superset_of_any(&carrier(&[a])));
        assert_eq!(list.iter().next().unwrap().carrier(), carrier(&[a]));
    }

    #[test]
    fn greedy_union_only_counts_shrinking_carriers() {
        let x = cell_at(0, 0);
        let y = cell_at(9, 9);
        let a = cell_at(1, 0);
        let b = cell_at(2, 0);
        let mut list = VcList::new(x, y, 10);
        list.force_add(Vc::full(x, y, carrier(&[a, b]), Rule::Base));
        list.force_add(Vc::full(x, y, carrier(&[a, b]), Rule::Base));
        let gu = list.greedy_union();
        assert_eq!(gu, carrier(&[a, b]));
    }
}
