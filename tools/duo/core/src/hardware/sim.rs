//! In-memory object engine.
//!
//! Mirrors what the real hardware keeps per surface: a staged and a
//! displayed object table, a 256-entry palette, 32 affine parameter sets and
//! a block of sprite graphics memory with a first-fit allocator. Nothing is
//! drawn; the state is there to be inspected.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::config::SpriteMapping;
use crate::hardware::oam::{ColorFormat, OamEntry, SpriteSize};
use crate::hardware::{GfxHandle, ObjectEngine};
use crate::pool::{AffineSlot, SlotId};
use crate::surface::Surface;
use crate::{AFFINE_COUNT, PALETTE_LEN, SCALE_ONE, SPRITE_COUNT};

/// Sprite graphics memory per surface (one 128KB bank each).
pub const GFX_BYTES_PER_SURFACE: usize = 128 * 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AffineParams {
    pub angle: i16,
    pub scale_x: i32,
    pub scale_y: i32,
}

impl AffineParams {
    pub const IDENTITY: Self = Self {
        angle: 0,
        scale_x: SCALE_ONE,
        scale_y: SCALE_ONE,
    };
}

#[derive(Debug, Copy, Clone)]
struct GfxBlock {
    offset: usize,
    /// Bytes the caller asked for.
    len: usize,
    /// Bytes held, rounded up to the mapping boundary.
    reserved: usize,
}

#[derive(Debug, Clone)]
pub struct SimScreen {
    mapping: SpriteMapping,
    extended_palette: bool,
    staged: [OamEntry; SPRITE_COUNT],
    oam: [OamEntry; SPRITE_COUNT],
    palette: [u16; PALETTE_LEN],
    affine: [AffineParams; AFFINE_COUNT],
    vram: Vec<u16>,
    // sorted by offset
    blocks: Vec<GfxBlock>,
    flushes: u32,
}

impl SimScreen {
    fn new(mapping: SpriteMapping) -> Self {
        let vram_bytes = GFX_BYTES_PER_SURFACE.min(mapping.addressable_bytes());
        Self {
            mapping,
            extended_palette: false,
            staged: [OamEntry::hidden(); SPRITE_COUNT],
            oam: [OamEntry::hidden(); SPRITE_COUNT],
            palette: [0; PALETTE_LEN],
            affine: [AffineParams::IDENTITY; AFFINE_COUNT],
            vram: vec![0; vram_bytes / 2],
            blocks: Vec::with_capacity(SPRITE_COUNT),
            flushes: 0,
        }
    }

    pub fn mapping(&self) -> SpriteMapping {
        self.mapping
    }

    pub fn extended_palette(&self) -> bool {
        self.extended_palette
    }

    pub fn palette(&self) -> &[u16; PALETTE_LEN] {
        &self.palette
    }

    /// Entry as last flushed to the display.
    pub fn object(&self, slot: usize) -> OamEntry {
        self.oam[slot]
    }

    /// Entry as written since the last flush.
    pub fn staged(&self, slot: usize) -> OamEntry {
        self.staged[slot]
    }

    pub fn affine(&self, index: usize) -> AffineParams {
        self.affine[index]
    }

    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    pub fn blocks_in_use(&self) -> usize {
        self.blocks.len()
    }

    pub fn gfx_bytes_in_use(&self) -> usize {
        self.blocks.iter().map(|b| b.reserved).sum()
    }

    pub fn gfx(&self, gfx: GfxHandle) -> Option<&[u16]> {
        let block = self.block(gfx)?;
        Some(&self.vram[block.offset / 2..(block.offset + block.len) / 2])
    }

    pub fn gfx_bytes(&self, gfx: GfxHandle) -> Option<&[u8]> {
        self.gfx(gfx).map(bytemuck::cast_slice)
    }

    fn block(&self, gfx: GfxHandle) -> Option<GfxBlock> {
        self.blocks
            .iter()
            .find(|b| b.offset == gfx.offset as usize)
            .copied()
    }

    fn capacity(&self) -> usize {
        self.vram.len() * 2
    }

    fn align(&self, offset: usize) -> usize {
        let boundary = self.mapping.boundary();
        offset.div_ceil(boundary) * boundary
    }

    fn allocate(&mut self, len: usize) -> Option<GfxHandle> {
        let reserved = self.align(len.max(1));

        let mut candidate = 0;
        for block in &self.blocks {
            if candidate + reserved <= block.offset {
                break;
            }
            candidate = self.align(block.offset + block.reserved);
        }

        if candidate + reserved > self.capacity() {
            return None;
        }

        let position = self
            .blocks
            .iter()
            .position(|b| b.offset > candidate)
            .unwrap_or(self.blocks.len());
        self.blocks.insert(
            position,
            GfxBlock {
                offset: candidate,
                len,
                reserved,
            },
        );
        self.vram[candidate / 2..(candidate + reserved) / 2].fill(0);

        Some(GfxHandle {
            offset: candidate as u32,
            tile: (candidate / self.mapping.boundary()) as u16,
        })
    }

    fn free(&mut self, gfx: GfxHandle) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.offset != gfx.offset as usize);
        before != self.blocks.len()
    }
}

/// Two [`SimScreen`]s and a vblank counter.
#[derive(Debug, Clone)]
pub struct SimEngine {
    screens: [SimScreen; 2],
    vblanks: u64,
}

impl SimEngine {
    pub fn new() -> Self {
        Self {
            screens: [
                SimScreen::new(SpriteMapping::default()),
                SimScreen::new(SpriteMapping::default()),
            ],
            vblanks: 0,
        }
    }

    pub fn screen(&self, surface: Surface) -> &SimScreen {
        &self.screens[surface.index()]
    }

    pub fn vblank_count(&self) -> u64 {
        self.vblanks
    }

    fn screen_mut(&mut self, surface: Surface) -> &mut SimScreen {
        &mut self.screens[surface.index()]
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectEngine for SimEngine {
    fn init(&mut self, surface: Surface, mapping: SpriteMapping, extended_palette: bool) {
        debug!("{} object engine init, {:?}", surface, mapping);
        let mut screen = SimScreen::new(mapping);
        screen.extended_palette = extended_palette;
        *self.screen_mut(surface) = screen;
    }

    fn allocate_gfx(&mut self, surface: Surface, size: SpriteSize, format: ColorFormat) -> Option<GfxHandle> {
        let len = size.gfx_bytes(format);
        let gfx = self.screen_mut(surface).allocate(len);
        if gfx.is_none() {
            warn!("{} graphics memory exhausted allocating {} bytes", surface, len);
        }
        gfx
    }

    fn free_gfx(&mut self, surface: Surface, gfx: GfxHandle) {
        if !self.screen_mut(surface).free(gfx) {
            warn!("{} graphics block at {:#x} was not allocated", surface, gfx.offset);
        }
    }

    fn gfx_mut(&mut self, surface: Surface, gfx: GfxHandle) -> Option<&mut [u16]> {
        let screen = self.screen_mut(surface);
        let block = screen.block(gfx)?;
        Some(&mut screen.vram[block.offset / 2..(block.offset + block.len) / 2])
    }

    fn upload_palette(&mut self, surface: Surface, offset: usize, colors: &[u16]) {
        let palette = &mut self.screen_mut(surface).palette;
        let end = (offset + colors.len()).min(PALETTE_LEN);
        if offset >= end {
            return;
        }
        palette[offset..end].copy_from_slice(&colors[..end - offset]);
    }

    fn copy_palette(&mut self, surface: Surface, src: usize, dst: usize, len: usize) {
        if src.max(dst) + len > PALETTE_LEN {
            warn!("{} palette copy {}..{} -> {} out of range", surface, src, src + len, dst);
            return;
        }
        self.screen_mut(surface).palette.copy_within(src..src + len, dst);
    }

    fn write_object(&mut self, surface: Surface, slot: SlotId, entry: OamEntry) {
        self.screen_mut(surface).staged[slot.index()] = entry;
    }

    fn set_affine(&mut self, surface: Surface, affine: AffineSlot, angle: i16, scale_x: i32, scale_y: i32) {
        self.screen_mut(surface).affine[affine.index()] = AffineParams {
            angle,
            scale_x,
            scale_y,
        };
    }

    fn flush(&mut self, surface: Surface) {
        let screen = self.screen_mut(surface);
        let staged: &[u8] = bytemuck::cast_slice(&screen.staged);
        bytemuck::cast_slice_mut::<OamEntry, u8>(&mut screen.oam).copy_from_slice(staged);
        screen.flushes += 1;
        trace!("{} object table flushed", surface);
    }

    fn wait_for_vblank(&mut self) {
        self.vblanks += 1;
    }
}
