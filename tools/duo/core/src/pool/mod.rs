//! Fixed-capacity id pools backed by a bitmap.
//!
//! Allocation is a first-fit scan from index 0, so the lowest free id is
//! always handed out first. That keeps slot assignment deterministic.

pub mod palette;

use bit_field::BitArray;
use log::warn;

/// Object-table slot on one surface, `0..128`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) u8);

impl SlotId {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Affine parameter slot on one surface, `0..32`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AffineSlot(pub(crate) u8);

impl AffineSlot {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

pub type SlotPool = BitPool<4>;
pub type AffinePool = BitPool<1>;

/// A set of `WORDS * 32` ids with a live count kept next to the bitmap.
///
/// `live() == popcount(taken)` holds after every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPool<const WORDS: usize> {
    taken: [u32; WORDS],
    live: usize,
}

impl<const WORDS: usize> BitPool<WORDS> {
    pub const CAPACITY: usize = WORDS * 32;

    pub const fn new() -> Self {
        Self {
            taken: [0; WORDS],
            live: 0,
        }
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        Self::CAPACITY
    }

    #[inline(always)]
    pub const fn live(&self) -> usize {
        self.live
    }

    #[inline(always)]
    pub const fn is_full(&self) -> bool {
        self.live == Self::CAPACITY
    }

    #[inline(always)]
    pub fn is_taken(&self, index: usize) -> bool {
        index < Self::CAPACITY && self.taken[..].get_bit(index)
    }

    /// Takes the lowest free id.
    pub fn allocate(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.first_free_from(0);
        self.mark(index);
        Some(index)
    }

    /// Returns an id to the pool. Releasing a free id is logged and ignored.
    pub fn release(&mut self, index: usize) -> bool {
        if !self.is_taken(index) {
            warn!("release of id {} which is not taken", index);
            return false;
        }
        self.taken[..].set_bit(index, false);
        self.live -= 1;
        true
    }

    /// Marks a specific id taken. Returns `false` if it already was.
    pub fn mark(&mut self, index: usize) -> bool {
        if index >= Self::CAPACITY || self.is_taken(index) {
            return false;
        }
        self.taken[..].set_bit(index, true);
        self.live += 1;
        true
    }

    pub fn mark_range(&mut self, start: usize, len: usize) {
        for index in start..start + len {
            self.mark(index);
        }
    }

    pub fn release_range(&mut self, start: usize, len: usize) {
        for index in start..start + len {
            self.release(index);
        }
    }

    /// First free id at or after `start`, or `CAPACITY` if there is none.
    pub fn first_free_from(&self, start: usize) -> usize {
        (start..Self::CAPACITY)
            .find(|&i| !self.taken[..].get_bit(i))
            .unwrap_or(Self::CAPACITY)
    }

    /// First taken id in `start..end`, or `end` if there is none.
    pub fn first_taken_in(&self, start: usize, end: usize) -> usize {
        let end = end.min(Self::CAPACITY);
        (start..end)
            .find(|&i| self.taken[..].get_bit(i))
            .unwrap_or(end)
    }

    pub fn popcount(&self) -> usize {
        self.taken.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter_taken(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::CAPACITY).filter(move |&i| self.taken[..].get_bit(i))
    }
}

impl<const WORDS: usize> Default for BitPool<WORDS> {
    fn default() -> Self {
        Self::new()
    }
}
