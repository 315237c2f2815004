//! # Palette region allocator
//!
//! Each surface has a 256-entry colour table. Entry 0 holds the transparent
//! colour and is permanently taken. Sprites get contiguous regions handed
//! out by a bump allocator:
//!
//! ```text
//!  0   1              16             31        high_water
//! ┌───┬──────────────┬──────────────┬─────────┬──────────────────┐
//! │ T │  (hole)      │  sprite B    │ sprite C│  free            │
//! └───┴──────────────┴──────────────┴─────────┴──────────────────┘
//! ```
//!
//! Destroying a sprite only clears its bitmap bits, so holes pile up below
//! the high-water mark until the [compactor](crate::compactor) slides the
//! live regions down again.

use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

use crate::pool::BitPool;
use crate::registry::SpriteId;
use crate::PALETTE_LEN;

#[derive(Debug, Clone)]
pub struct PaletteAllocator {
    taken: BitPool<8>,
    high_water: usize,
    /// Owner of the region starting at each offset.
    owners: [Option<SpriteId>; PALETTE_LEN],
}

impl PaletteAllocator {
    pub fn new() -> Self {
        let mut taken = BitPool::new();
        taken.mark(0);
        Self {
            taken,
            high_water: 1,
            owners: [None; PALETTE_LEN],
        }
    }

    /// Next offset the bump allocator will hand out.
    #[inline(always)]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Entries left above the high-water mark.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        PALETTE_LEN - self.high_water
    }

    #[inline(always)]
    pub fn can_fit(&self, len: usize) -> bool {
        len <= self.remaining()
    }

    #[inline(always)]
    pub fn is_taken(&self, offset: usize) -> bool {
        self.taken.is_taken(offset)
    }

    pub fn taken_count(&self) -> usize {
        self.taken.live()
    }

    pub fn owner_at(&self, offset: usize) -> Option<SpriteId> {
        self.owners.get(offset).copied().flatten()
    }

    /// First unoccupied entry, or 256 when the table is full.
    pub fn first_free(&self) -> usize {
        self.taken.first_free_from(0)
    }

    /// First occupied entry in `start..high_water`, or the high-water mark.
    pub(crate) fn next_taken(&self, start: usize) -> usize {
        self.taken.first_taken_in(start, self.high_water)
    }

    /// Takes `len` entries at the high-water mark.
    pub(crate) fn reserve(&mut self, len: usize) -> Option<usize> {
        if !self.can_fit(len) {
            return None;
        }
        let offset = self.high_water;
        self.high_water += len;
        self.taken.mark_range(offset, len);
        Some(offset)
    }

    pub(crate) fn assign_owner(&mut self, offset: usize, len: usize, owner: SpriteId) {
        if len > 0 && offset < PALETTE_LEN {
            self.owners[offset] = Some(owner);
        }
    }

    /// Frees a region's entries without moving the high-water mark.
    pub(crate) fn release(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.taken.release_range(offset, len);
        if offset < PALETTE_LEN {
            self.owners[offset] = None;
        }
    }

    /// Moves a region's bookkeeping from `old` to `new`. The ranges may overlap.
    pub(crate) fn relocate(&mut self, old: usize, new: usize, len: usize) {
        let owner = self.owners[old].take();
        self.taken.release_range(old, len);
        self.taken.mark_range(new, len);
        self.owners[new] = owner;
    }

    pub(crate) fn set_high_water(&mut self, offset: usize) {
        self.high_water = offset.min(PALETTE_LEN);
    }

    /// Live regions as `(offset, owner)`, lowest offset first.
    pub fn regions(&self) -> impl Iterator<Item = (usize, SpriteId)> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter_map(|(offset, owner)| owner.map(|id| (offset, id)))
    }

    /// Runs of unoccupied entries below the high-water mark.
    pub fn holes(&self) -> Vec<(usize, usize)> {
        let mut holes = Vec::new();
        let mut cursor = self.taken.first_free_from(0);
        while cursor < self.high_water {
            let end = self.taken.first_taken_in(cursor, self.high_water);
            holes.push((cursor, end - cursor));
            cursor = self.taken.first_free_from(end);
        }
        holes
    }

    pub fn report(&self) -> PaletteReport {
        PaletteReport {
            high_water: self.high_water,
            taken: self.taken.live(),
            regions: self.regions().map(|(offset, _)| offset).collect(),
            holes: self.holes(),
        }
    }
}

impl Default for PaletteAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one surface's palette occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteReport {
    pub high_water: usize,
    /// Occupied entries, the transparent entry included.
    pub taken: usize,
    /// Start offsets of live regions.
    pub regions: Vec<usize>,
    /// `(offset, len)` gaps below the high-water mark.
    pub holes: Vec<(usize, usize)>,
}

impl PaletteReport {
    /// Entries below the high-water mark that nothing uses.
    pub fn fragmented(&self) -> usize {
        self.holes.iter().map(|(_, len)| len).sum()
    }
}

impl Display for PaletteReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "high water {:3}, {:3} taken, {} regions, {} entries in {} holes",
            self.high_water,
            self.taken,
            self.regions.len(),
            self.fragmented(),
            self.holes.len()
        )
    }
}

/// Adds `delta` to every nonzero 8-bit palette index in `pixels`.
///
/// Index 0 is transparent and always stays 0.
pub fn shift_indices(pixels: &mut [u8], delta: i32) {
    if delta == 0 {
        return;
    }
    let delta = delta as u8;
    for px in pixels.iter_mut().filter(|px| **px != 0) {
        *px = px.wrapping_add(delta);
    }
}
