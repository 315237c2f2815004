use alloc::string::String;

use crate::hardware::oam::ColorFormat;
use crate::surface::Surface;

/// Everything a sprite operation can refuse to do.
///
/// None of these are fatal. A failed operation leaves every pool exactly as
/// it found it, and the reason is also logged at `warn` level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpriteError {
    #[error("sprite with name {0} already exists")]
    DuplicateName(String),

    #[error("object table on {0} surface is full")]
    SlotPoolFull(Surface),

    #[error("palette full for sprite {name} on {surface} surface: {needed} entries needed, {available} free")]
    PaletteFull {
        name: String,
        surface: Surface,
        needed: usize,
        available: usize,
    },

    #[error("no sprite named {0}")]
    NotFound(String),

    #[error("graphics memory on {0} surface is exhausted")]
    GraphicsMemoryFull(Surface),

    #[error("all affine slots on {0} surface are taken")]
    AffinePoolFull(Surface),

    #[error("sprite {0} uses {1:?}, only 256-colour sprites can be palette-offset")]
    UnsupportedColorFormat(String, ColorFormat),

    #[error("sprite handle refers to a destroyed sprite")]
    StaleHandle,
}
