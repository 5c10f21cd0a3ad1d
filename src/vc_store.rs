//! Per-pair storage: one [`VcList`] of FULL and one of SEMI connections for
//! every unordered pair of captains that currently has at least one VC.

use crate::bitset::BitSet;
use crate::carrier_list::VcList;
use crate::cell::Cell;
use crate::changelog::ChangeLog;
use crate::vc::{Kind, Vc};
use std::collections::HashMap;

const DEFAULT_SOFT_LIMIT: usize = 64;

fn key(x: Cell, y: Cell) -> (Cell, Cell) {
    if x <= y { (x, y) } else { (y, x) }
}

/// All VCs in a position, bucketed by endpoint pair and FULL/SEMI kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VcStore {
    full: HashMap<(Cell, Cell), VcList>,
    semi: HashMap<(Cell, Cell), VcList>,
    soft_limit: usize,
}

impl VcStore {
    pub fn new() -> Self {
        VcStore {
            full: HashMap::new(),
            semi: HashMap::new(),
            soft_limit: DEFAULT_SOFT_LIMIT,
        }
    }

    pub fn with_soft_limit(soft_limit: usize) -> Self {
        VcStore {
            full: HashMap::new(),
            semi: HashMap::new(),
            soft_limit,
        }
    }

    fn table(&self, kind: Kind) -> &HashMap<(Cell, Cell), VcList> {
        match kind {
            Kind::Full => &self.full,
            Kind::Semi => &self.semi,
        }
    }

    fn table_mut(&mut self, kind: Kind) -> &mut HashMap<(Cell, Cell), VcList> {
        match kind {
            Kind::Full => &mut self.full,
            Kind::Semi => &mut self.semi,
        }
    }

    pub fn get(&self, kind: Kind, x: Cell, y: Cell) -> Option<&VcList> {
        self.table(kind).get(&key(x, y))
    }

    fn get_or_create_mut(&mut self, kind: Kind, x: Cell, y: Cell) -> &mut VcList {
        let (a, b) = key(x, y);
        let soft_limit = self.soft_limit;
        self.table_mut(kind)
            .entry((a, b))
            .or_insert_with(|| VcList::new(a, b, soft_limit))
    }

    /// Inserts `vc`, creating the endpoint pair's list on demand. Returns
    /// `false` if a subset carrier was already present.
    pub fn add(&mut self, vc: Vc, log: Option<&mut ChangeLog<Vc>>) -> bool {
        let kind = vc.kind();
        let list = self.get_or_create_mut(kind, vc.x(), vc.y());
        list.add(vc, log) != crate::carrier_list::AddResult::Failed
    }

    pub fn remove_all_containing(
        &mut self,
        kind: Kind,
        x: Cell,
        y: Cell,
        mask: &BitSet,
        log: Option<&mut ChangeLog<Vc>>,
    ) -> Vec<Vc> {
        match self.table_mut(kind).get_mut(&key(x, y)) {
            Some(list) => list.remove_all_containing(mask, log),
            None => Vec::new(),
        }
    }

    /// Removes every stored VC (either kind, any pair) whose carrier
    /// intersects `mask` — used when a cell is played and must vacate every
    /// carrier that relied on it remaining empty.
    pub fn remove_all_containing_everywhere(
        &mut self,
        mask: &BitSet,
        mut log: Option<&mut ChangeLog<Vc>>,
    ) -> Vec<Vc> {
        let mut removed = Vec::new();
        for list in self.full.values_mut().chain(self.semi.values_mut()) {
            removed.extend(list.remove_all_containing(mask, log.as_deref_mut()));
        }
        removed
    }

    /// Removes every VC (either kind) incident to captain `z`, regardless
    /// of its partner. Used by incremental rebuilds, which conservatively
    /// discard and regenerate everything touching a changed group rather
    /// than reshrinking individual carriers in place.
    pub fn remove_incident(&mut self, z: Cell, mut log: Option<&mut ChangeLog<Vc>>) -> Vec<Vc> {
        let mut removed = Vec::new();
        for table in [&mut self.full, &mut self.semi] {
            let keys: Vec<(Cell, Cell)> = table
                .keys()
                .filter(|&&(a, b)| a == z || b == z)
                .copied()
                .collect();
            for k in keys {
                if let Some(list) = table.get_mut(&k) {
                    for v in list.iter().copied().collect::<Vec<_>>() {
                        list.remove(&v, log.as_deref_mut());
                        removed.push(v);
                    }
                    if list.is_empty() {
                        table.remove(&k);
                    }
                }
            }
        }
        removed
    }

    /// Removes a specific VC, wherever it lives.
    pub fn remove(&mut self, vc: &Vc, log: Option<&mut ChangeLog<Vc>>) -> bool {
        let kind = vc.kind();
        match self.table_mut(kind).get_mut(&key(vc.x(), vc.y())) {
            Some(list) => list.remove(vc, log),
            None => false,
        }
    }

    /// Force-reinserts a VC exactly as it was, bypassing the superset
    /// filter. Used to replay a changelog `Remove` entry during revert.
    pub fn force_restore(&mut self, vc: Vc) {
        let list = self.get_or_create_mut(vc.kind(), vc.x(), vc.y());
        list.unchecked_restore(vc);
    }

    /// Merges every list keyed on `absorbed` into the corresponding list
    /// keyed on `survivor`, dropping now-empty entries. Used when two
    /// groups merge into one after a move.
    pub fn merge_captain(
        &mut self,
        kind: Kind,
        absorbed: Cell,
        survivor: Cell,
        other_endpoints: &[Cell],
        mut log: Option<&mut ChangeLog<Vc>>,
    ) {
        for &other in other_endpoints {
            if other == absorbed || other == survivor {
                continue;
            }
            let from_key = key(absorbed, other);
            if let Some(from_list) = self.table(kind).get(&from_key).cloned() {
                let to = self.get_or_create_mut(kind, survivor, other);
                to.add_list(&from_list, log.as_deref_mut());
            }
            self.table_mut(kind).remove(&from_key);
        }
    }

    pub fn clear(&mut self) {
        self.full.clear();
        self.semi.clear();
    }

    pub fn iter_pairs(&self, kind: Kind) -> impl Iterator<Item = (&(Cell, Cell), &VcList)> {
        self.table(kind).iter()
    }

    pub fn len(&self, kind: Kind) -> usize {
        self.table(kind).values().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.full.values().all(|l| l.is_empty()) && self.semi.values().all(|l| l.is_empty())
    }

    /// Union carrier of every FULL connection between `x` and `y`, or an
    /// all-ones (impossible) bitset if none exists.
    pub fn full_union(&mut self, x: Cell, y: Cell) -> Option<BitSet> {
        self.full.get_mut(&key(x, y)).map(|l| l.union())
    }
}
