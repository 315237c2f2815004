//! # Palette compaction
//!
//! Slides a surface's live palette regions down over the holes destroyed
//! sprites left behind. Each move copies the colours, rebases the owner's
//! uploaded pixel indices by the distance moved and updates its offset, so
//! every sprite keeps the same colours. Afterwards the high-water mark sits
//! right above the last live region.

use log::{debug, info, warn};

use crate::hardware::{GfxHandle, ObjectEngine};
use crate::pool::palette::shift_indices;
use crate::surface::Surface;
use crate::SpriteEngine;

/// What a compaction pass did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Regions relocated.
    pub moved: usize,
    /// Entries returned above the high-water mark.
    pub reclaimed: usize,
}

/// Adds `delta` to the nonzero pixel indices of an uploaded graphics block.
pub(crate) fn shift_gfx<H: ObjectEngine>(hardware: &mut H, surface: Surface, gfx: GfxHandle, delta: i32) {
    if delta == 0 {
        return;
    }
    match hardware.gfx_mut(surface, gfx) {
        Some(words) => shift_indices(bytemuck::cast_slice_mut(words), delta),
        None => warn!("{} graphics block at {:#x} vanished", surface, gfx.offset),
    }
}

impl<H: ObjectEngine> SpriteEngine<H> {
    /// Packs `surface`'s palette regions toward entry 1.
    ///
    /// Running it twice in a row is the same as running it once. A taken
    /// entry no live sprite owns stops the pass early and leaves the
    /// high-water mark where it was.
    pub fn compact(&mut self, surface: Surface) -> Compaction {
        let palette = &mut self.surfaces[surface.index()].palette;
        let before = palette.high_water();
        info!("compacting {} palette, high water {}", surface, before);

        let mut stats = Compaction::default();
        let mut new = palette.first_free();
        let mut old = new;

        loop {
            old = palette.next_taken(old);
            if old >= palette.high_water() {
                break;
            }

            let Some(sprite) = palette
                .owner_at(old)
                .and_then(|id| self.registry.get_mut(id))
            else {
                warn!("{} palette entry {} has no owner, compaction stopped", surface, old);
                return stats;
            };
            let len = sprite.palette_len();

            if old != new {
                debug!("{}: palette {} -> {} ({} entries)", sprite.name(), old, new, len);
                self.hardware.copy_palette(surface, old, new, len);
                shift_gfx(&mut self.hardware, surface, sprite.binding.gfx, new as i32 - old as i32);
                palette.relocate(old, new, len);
                sprite.binding.palette_offset = new;
                stats.moved += 1;
            }

            new += len;
            old += len;
        }

        palette.set_high_water(new);
        stats.reclaimed = before - new;
        info!(
            "{} palette compacted, {} regions moved, high water {} -> {}",
            surface, stats.moved, before, new
        );
        stats
    }
}
