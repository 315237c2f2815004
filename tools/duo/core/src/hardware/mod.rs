//! The boundary to the 2D object hardware.
//!
//! [`ObjectEngine`] is everything the sprite manager needs from the platform:
//! graphics memory, palette tables, the object table and the affine
//! parameter table of each surface, plus the vertical blank wait. A real
//! console backend maps these onto its registers and DMA; [`sim::SimEngine`]
//! keeps them in memory.

pub mod oam;
pub mod sim;

use crate::config::SpriteMapping;
use crate::hardware::oam::{ColorFormat, OamEntry, SpriteSize};
use crate::pool::{AffineSlot, SlotId};
use crate::surface::Surface;

/// A block of sprite graphics memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GfxHandle {
    /// Byte offset into the surface's sprite graphics memory.
    pub offset: u32,
    /// Tile index the object table uses to address the block.
    pub tile: u16,
}

pub trait ObjectEngine {
    /// Sets up the object engine of one surface.
    fn init(&mut self, _surface: Surface, _mapping: SpriteMapping, _extended_palette: bool) {
        // default impl do nothing
    }

    /// Allocates graphics memory for one object. `None` when exhausted.
    fn allocate_gfx(&mut self, surface: Surface, size: SpriteSize, format: ColorFormat) -> Option<GfxHandle>;

    fn free_gfx(&mut self, surface: Surface, gfx: GfxHandle);

    /// CPU view of an allocated block, as halfwords.
    fn gfx_mut(&mut self, surface: Surface, gfx: GfxHandle) -> Option<&mut [u16]>;

    /// Writes `colors` into the palette table starting at `offset`.
    fn upload_palette(&mut self, surface: Surface, offset: usize, colors: &[u16]);

    /// Copies `len` palette entries from `src` to `dst`.
    ///
    /// Must behave like a forward copy when the ranges overlap with
    /// `dst < src`, which is what compaction does.
    fn copy_palette(&mut self, surface: Surface, src: usize, dst: usize, len: usize);

    /// Stages an object-table entry. Visible after the next [`flush`](Self::flush).
    fn write_object(&mut self, surface: Surface, slot: SlotId, entry: OamEntry);

    fn clear_object(&mut self, surface: Surface, slot: SlotId) {
        self.write_object(surface, slot, OamEntry::hidden());
    }

    /// Loads rotation (hardware angle units) and 8.8 scale into an affine slot.
    fn set_affine(&mut self, surface: Surface, affine: AffineSlot, angle: i16, scale_x: i32, scale_y: i32);

    /// Pushes the staged object table to the display.
    fn flush(&mut self, surface: Surface);

    /// Blocks until the next vertical blank.
    fn wait_for_vblank(&mut self);
}
