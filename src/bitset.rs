//! Fixed-capacity bit set used for carriers, stone sets, and masks.
//!
//! Backed by a `[u64; BITSET_WORDS]` array sized by the active board-size
//! feature (see [`crate::constants`]). No operation allocates.

use crate::cell::Cell;
use crate::constants::{BITSET_WORDS, BITSETSIZE};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitSet {
    words: [u64; BITSET_WORDS],
}

pub const EMPTY_BITSET: BitSet = BitSet {
    words: [0u64; BITSET_WORDS],
};

impl BitSet {
    #[inline]
    pub fn new() -> Self {
        EMPTY_BITSET
    }

    #[inline]
    fn word_bit(index: Cell) -> (usize, u32) {
        let i = index as usize;
        debug_assert!(i < BITSETSIZE);
        (i / 64, (i % 64) as u32)
    }

    #[inline]
    pub fn test(&self, index: Cell) -> bool {
        let (w, b) = Self::word_bit(index);
        (self.words[w] >> b) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, index: Cell) {
        let (w, b) = Self::word_bit(index);
        self.words[w] |= 1u64 << b;
    }

    #[inline]
    pub fn reset(&mut self, index: Cell) {
        let (w, b) = Self::word_bit(index);
        self.words[w] &= !(1u64 << b);
    }

    #[inline]
    pub fn set_to(&mut self, index: Cell, value: bool) {
        if value {
            self.set(index);
        } else {
            self.reset(index);
        }
    }

    #[inline]
    pub fn flip_all(&mut self) {
        for w in self.words.iter_mut() {
            *w = !*w;
        }
        self.mask_unused();
    }

    /// Clears any bits beyond `BITSETSIZE` that could have been set by
    /// `flip_all` on a partially-filled final word.
    #[inline]
    fn mask_unused(&mut self) {
        let used_bits = BITSETSIZE % 64;
        if used_bits != 0 {
            let last = BITSET_WORDS - 1;
            self.words[last] &= (1u64 << used_bits) - 1;
        }
    }

    #[inline]
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[inline]
    pub fn any(&self) -> bool {
        !self.none()
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    #[inline]
    pub fn union(&self, other: &BitSet) -> BitSet {
        let mut out = *self;
        out.union_with(other);
        out
    }

    #[inline]
    pub fn union_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= b;
        }
    }

    #[inline]
    pub fn intersection(&self, other: &BitSet) -> BitSet {
        let mut out = *self;
        out.intersect_with(other);
        out
    }

    #[inline]
    pub fn intersect_with(&mut self, other: &BitSet) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a &= b;
        }
    }

    #[inline]
    pub fn xor(&self, other: &BitSet) -> BitSet {
        let mut out = *self;
        for (a, b) in out.words.iter_mut().zip(other.words.iter()) {
            *a ^= b;
        }
        out
    }

    /// `self \ other`, i.e. `self & !other` — the single subtraction idiom
    /// this crate exposes (no `Sub` operator overload).
    #[inline]
    pub fn difference(&self, other: &BitSet) -> BitSet {
        let mut out = *self;
        for (a, b) in out.words.iter_mut().zip(other.words.iter()) {
            *a &= !b;
        }
        out
    }

    #[inline]
    pub fn is_subset_of(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(&a, &b)| a & !b == 0)
    }

    #[inline]
    pub fn is_superset_of(&self, other: &BitSet) -> bool {
        other.is_subset_of(self)
    }

    #[inline]
    pub fn intersects(&self, other: &BitSet) -> bool {
        self.words.iter().zip(other.words.iter()).any(|(&a, &b)| a & b != 0)
    }

    /// Deterministic total order used for tie-breaking (lexicographic over
    /// the word array, most-significant word first).
    #[inline]
    pub fn is_less_than(&self, other: &BitSet) -> bool {
        for i in (0..BITSET_WORDS).rev() {
            if self.words[i] != other.words[i] {
                return self.words[i] < other.words[i];
            }
        }
        false
    }

    /// Ascending iteration over set bit indices.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            words: &self.words,
            word_idx: 0,
            cur: self.words.first().copied().unwrap_or(0),
        }
    }

    pub fn first_set(&self) -> Option<Cell> {
        self.iter().next()
    }

    /// Serialises to a zero-padded little-endian byte stream, one bit per
    /// cell in ascending index order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BITSETSIZE.div_ceil(8));
        for &w in self.words.iter() {
            out.extend_from_slice(&w.to_le_bytes());
        }
        out.truncate(BITSETSIZE.div_ceil(8));
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<BitSet> {
        if bytes.len() > BITSETSIZE.div_ceil(8) {
            return None;
        }
        let mut words = [0u64; BITSET_WORDS];
        for (i, chunk) in bytes.chunks(8).enumerate() {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            words[i] = u64::from_le_bytes(buf);
        }
        let mut bs = BitSet { words };
        bs.mask_unused();
        Some(bs)
    }

    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn from_hex(s: &str) -> Option<BitSet> {
        if !s.len().is_multiple_of(2) {
            return None;
        }
        let bytes: Option<Vec<u8>> = (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect();
        BitSet::from_bytes(&bytes?)
    }
}

pub struct BitSetIter<'a> {
    words: &'a [u64; BITSET_WORDS],
    word_idx: usize,
    cur: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        loop {
            if self.cur != 0 {
                let bit = self.cur.trailing_zeros();
                self.cur &= self.cur - 1;
                return Some((self.word_idx * 64 + bit as usize) as Cell);
            }
            self.word_idx += 1;
            if self.word_idx >= BITSET_WORDS {
                return None;
            }
            self.cur = self.words[self.word_idx];
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet{:?}", self.iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_test_reset_roundtrip() {
        let mut bs = BitSet::new();
        bs.set(10);
        assert!(bs.test(10));
        bs.reset(10);
        assert!(!bs.test(10));
    }

    #[test]
    fn distributive_law() {
        let mut a = BitSet::new();
        a.set(1);
        a.set(5);
        let mut b = BitSet::new();
        b.set(5);
        b.set(9);
        let mut not_b = b;
        not_b.flip_all();
        let lhs = a.intersection(&b).union(&a.intersection(&not_b));
        assert_eq!(lhs, a);
    }

    #[test]
    fn subset_iff_and_equals_self() {
        let mut a = BitSet::new();
        a.set(3);
        let mut b = BitSet::new();
        b.set(3);
        b.set(4);
        assert!(a.is_subset_of(&b));
        assert_eq!(a.intersection(&b), a);
    }

    #[test]
    fn iteration_ascending_and_count_matches() {
        let mut bs = BitSet::new();
        for i in [50u16, 2, 30, 2] {
            bs.set(i);
        }
        let got: Vec<_> = bs.iter().collect();
        assert_eq!(got, vec![2, 30, 50]);
        assert_eq!(bs.count(), got.len() as u32);
    }

    #[test]
    fn byte_and_hex_roundtrip() {
        let mut bs = BitSet::new();
        bs.set(0);
        bs.set(63);
        bs.set(100 % (crate::constants::BITSETSIZE as u16));
        let bytes = bs.to_bytes();
        assert_eq!(BitSet::from_bytes(&bytes), Some(bs));
        let hex = bs.to_hex();
        assert_eq!(BitSet::from_hex(&hex), Some(bs));
    }

    #[test]
    fn difference_is_and_not() {
        let mut a = BitSet::new();
        a.set(1);
        a.set(2);
        let mut b = BitSet::new();
        b.set(2);
        let mut expected = BitSet::new();
        expected.set(1);
        assert_eq!(a.difference(&b), expected);
    }

    #[test]
    fn deterministic_order_total() {
        let mut a = BitSet::new();
        a.set(5);
        let mut b = BitSet::new();
        b.set(6);
        assert!(a.is_less_than(&b) ^ b.is_less_than(&a));
    }

    fn bitset_from(cells: &[u16]) -> BitSet {
        let mut bs = BitSet::new();
        for &c in cells {
            bs.set(c % crate::constants::BITSETSIZE as u16);
        }
        bs
    }

    proptest::proptest! {
        #[test]
        fn union_is_commutative(a in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20),
                                 b in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20)) {
            let (a, b) = (bitset_from(&a), bitset_from(&b));
            proptest::prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn intersection_with_union_is_self(a in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20),
                                            b in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20)) {
            let (a, b) = (bitset_from(&a), bitset_from(&b));
            proptest::prop_assert_eq!(a.intersection(&a.union(&b)), a);
        }

        #[test]
        fn subset_of_union_always_holds(a in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20),
                                         b in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20)) {
            let (a, b) = (bitset_from(&a), bitset_from(&b));
            proptest::prop_assert!(a.is_subset_of(&a.union(&b)));
            proptest::prop_assert!(a.intersection(&b).is_subset_of(&a));
        }

        #[test]
        fn difference_then_union_restores_original(a in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20),
                                                    b in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20)) {
            let (a, b) = (bitset_from(&a), bitset_from(&b));
            let restored = a.difference(&b).union(&a.intersection(&b));
            proptest::prop_assert_eq!(restored, a);
        }

        #[test]
        fn hex_roundtrip_always_matches(a in proptest::collection::vec(0u16..crate::constants::BITSETSIZE as u16, 0..20)) {
            let bs = bitset_from(&a);
            proptest::prop_assert_eq!(BitSet::from_hex(&bs.to_hex()), Some(bs));
        }
    }
}
