use log::{info, trace};

use crate::hardware::oam::OamEntry;
use crate::hardware::ObjectEngine;
use crate::surface::Surface;
use crate::{SpriteEngine, PALETTE_LEN};

impl<H: ObjectEngine> SpriteEngine<H> {
    /// Per-frame pass. Call once per tick, before
    /// [`wait_for_vblank`](Self::wait_for_vblank).
    ///
    /// Writes one object-table entry per live sprite, flushes both surfaces
    /// and then compacts any surface whose palette has less than
    /// [`palette_headroom`](crate::EngineConfig::palette_headroom) entries
    /// left, so the next creation is unlikely to stall on a compaction.
    pub fn update_all(&mut self) {
        for (_, sprite) in self.registry.iter() {
            let entry = OamEntry::encode(&sprite.object_attributes());
            trace!(
                "{} slot {} -> ({}, {}) {:04x} {:04x} {:04x}",
                sprite.name(),
                sprite.slot().index(),
                entry.x(),
                entry.y(),
                entry.attr0,
                entry.attr1,
                entry.attr2
            );
            self.hardware.write_object(sprite.surface(), sprite.slot(), entry);
        }

        for surface in Surface::ALL {
            self.hardware.flush(surface);
        }

        for surface in Surface::ALL {
            if self.needs_compaction(surface) {
                info!("{} palette is running out, compacting", surface);
                self.compact(surface);
            }
        }
    }

    fn needs_compaction(&self, surface: Surface) -> bool {
        let high_water = self.surfaces[surface.index()].palette.high_water();
        high_water + self.config.palette_headroom > PALETTE_LEN - 1
    }
}
