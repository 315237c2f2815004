use core::fmt::{Display, Formatter};

use crate::pool::palette::PaletteAllocator;
use crate::pool::{AffinePool, AffineSlot, SlotId, SlotPool};
use crate::{SCREEN_HEIGHT, WORLD_HEIGHT};

/// One of the two display surfaces.
///
/// The logical coordinate space is 384 units tall. `y` in `0..192` lands on
/// the primary surface, `192..384` on the secondary one, and anything outside
/// wraps around.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surface {
    Primary,
    Secondary,
}

impl Surface {
    pub const ALL: [Surface; 2] = [Surface::Primary, Surface::Secondary];

    #[inline(always)]
    pub const fn index(self) -> usize {
        match self {
            Surface::Primary => 0,
            Surface::Secondary => 1,
        }
    }

    pub const fn other(self) -> Surface {
        match self {
            Surface::Primary => Surface::Secondary,
            Surface::Secondary => Surface::Primary,
        }
    }

    /// The surface a logical vertical position belongs to.
    pub const fn for_y(y: i32) -> Surface {
        if y.rem_euclid(WORLD_HEIGHT) < SCREEN_HEIGHT {
            Surface::Primary
        } else {
            Surface::Secondary
        }
    }

    /// Maps a logical vertical position into `0..192` on its own surface.
    pub const fn local_y(y: i32) -> i32 {
        y.rem_euclid(WORLD_HEIGHT) % SCREEN_HEIGHT
    }

    pub const fn name(self) -> &'static str {
        match self {
            Surface::Primary => "main",
            Surface::Secondary => "sub",
        }
    }
}

impl Display for Surface {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The resource pools owned by one surface.
///
/// Two of these exist per [`SpriteEngine`](crate::SpriteEngine), one per
/// [`Surface`]. Nothing in here is ever shared between surfaces.
#[derive(Debug, Clone)]
pub struct SurfaceContext {
    pub(crate) slots: SlotPool,
    pub(crate) affine: AffinePool,
    pub(crate) palette: PaletteAllocator,
}

impl SurfaceContext {
    pub fn new() -> Self {
        Self {
            slots: SlotPool::new(),
            affine: AffinePool::new(),
            palette: PaletteAllocator::new(),
        }
    }

    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    pub fn affine(&self) -> &AffinePool {
        &self.affine
    }

    pub fn palette(&self) -> &PaletteAllocator {
        &self.palette
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    pub(crate) fn allocate_slot(&mut self) -> Option<SlotId> {
        self.slots.allocate().map(|id| SlotId(id as u8))
    }

    pub(crate) fn release_slot(&mut self, slot: SlotId) {
        self.slots.release(slot.index());
    }

    pub(crate) fn allocate_affine(&mut self) -> Option<AffineSlot> {
        self.affine.allocate().map(|id| AffineSlot(id as u8))
    }

    pub(crate) fn release_affine(&mut self, affine: AffineSlot) {
        self.affine.release(affine.index());
    }
}

impl Default for SurfaceContext {
    fn default() -> Self {
        Self::new()
    }
}
