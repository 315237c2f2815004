use crate::{MAX_SPRITE_PALETTE_LEN, TRANSPARENT_COLOR};

/// How tile indices in the object table address sprite graphics memory.
///
/// In the 1D modes a tile index counts blocks of `boundary()` bytes, so a
/// larger boundary reaches more memory at a coarser allocation granularity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SpriteMapping {
    #[default]
    OneD32,
    OneD64,
    OneD128,
    OneD256,
}

impl SpriteMapping {
    /// Allocation granularity in bytes.
    pub const fn boundary(self) -> usize {
        match self {
            SpriteMapping::OneD32 => 32,
            SpriteMapping::OneD64 => 64,
            SpriteMapping::OneD128 => 128,
            SpriteMapping::OneD256 => 256,
        }
    }

    /// Bytes reachable through the 10-bit tile index.
    pub const fn addressable_bytes(self) -> usize {
        self.boundary() * 1024
    }
}

/// Engine-wide settings, applied once in
/// [`SpriteEngine::new`](crate::SpriteEngine::new).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub mapping: SpriteMapping,
    pub extended_palette: bool,
    /// Written to palette entry 0 of both surfaces.
    pub transparent_color: u16,
    /// Free entries the end-of-frame check wants above the high-water mark
    /// before it forces a compaction.
    pub palette_headroom: usize,
}

impl EngineConfig {
    pub fn with_mapping(mut self, mapping: SpriteMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_extended_palette(mut self, extended_palette: bool) -> Self {
        self.extended_palette = extended_palette;
        self
    }

    pub fn with_transparent_color(mut self, color: u16) -> Self {
        self.transparent_color = color;
        self
    }

    pub fn with_palette_headroom(mut self, entries: usize) -> Self {
        self.palette_headroom = entries;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mapping: SpriteMapping::OneD32,
            extended_palette: false,
            transparent_color: TRANSPARENT_COLOR,
            palette_headroom: MAX_SPRITE_PALETTE_LEN,
        }
    }
}
