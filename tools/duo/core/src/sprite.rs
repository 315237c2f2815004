use alloc::string::String;

use crate::hardware::oam::{ColorFormat, ObjectAttributes, ObjectFlags, SpriteSize};
use crate::hardware::GfxHandle;
use crate::pool::{AffineSlot, SlotId};
use crate::surface::Surface;
use crate::SCALE_ONE;

/// Everything needed to (re)build a sprite.
///
/// `palette` is the sprite's own colour list. Its entry 0 is the transparent
/// colour and is never uploaded, so a 16-colour palette occupies 15 entries
/// of the surface table. `tiles` holds 8-bit indices into `palette`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteAttributes {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub tiles: &'static [u8],
    pub palette: &'static [u16],
    pub size: SpriteSize,
    pub color_format: ColorFormat,
    pub priority: u8,
    pub alpha: u8,
    pub flags: ObjectFlags,
    /// Degrees, accumulated by [`rotate`](crate::SpriteEngine::rotate).
    pub rotation: i32,
    /// 8.8 fixed point, 256 is 1.0.
    pub scale_x: i32,
    pub scale_y: i32,
}

impl SpriteAttributes {
    pub fn new(name: impl Into<String>, x: i32, y: i32, tiles: &'static [u8], palette: &'static [u16]) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            tiles,
            palette,
            size: SpriteSize::default(),
            color_format: ColorFormat::default(),
            priority: 0,
            alpha: 0,
            flags: ObjectFlags::empty(),
            rotation: 0,
            scale_x: SCALE_ONE,
            scale_y: SCALE_ONE,
        }
    }

    pub fn with_size(mut self, size: SpriteSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_color_format(mut self, format: ColorFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale_x: i32, scale_y: i32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Surface the current position belongs to.
    pub fn surface(&self) -> Surface {
        Surface::for_y(self.y)
    }

    /// Palette entries the sprite occupies, transparent entry excluded.
    pub fn palette_len(&self) -> usize {
        self.palette.len().saturating_sub(1)
    }

    pub fn has_transform(&self) -> bool {
        self.rotation != 0 || self.scale_x != SCALE_ONE || self.scale_y != SCALE_ONE
    }
}

/// Hardware resources a live sprite holds on its surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Binding {
    pub surface: Surface,
    pub slot: SlotId,
    pub gfx: GfxHandle,
    pub palette_offset: usize,
    pub affine: Option<AffineSlot>,
}

/// A live sprite: its attributes plus the resources bound to them.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub(crate) attributes: SpriteAttributes,
    pub(crate) binding: Binding,
}

impl Sprite {
    pub fn attributes(&self) -> &SpriteAttributes {
        &self.attributes
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn x(&self) -> i32 {
        self.attributes.x
    }

    pub fn y(&self) -> i32 {
        self.attributes.y
    }

    pub fn width(&self) -> i32 {
        self.attributes.size.width()
    }

    pub fn height(&self) -> i32 {
        self.attributes.size.height()
    }

    pub fn surface(&self) -> Surface {
        self.binding.surface
    }

    pub fn slot(&self) -> SlotId {
        self.binding.slot
    }

    pub fn gfx(&self) -> GfxHandle {
        self.binding.gfx
    }

    pub fn palette_offset(&self) -> usize {
        self.binding.palette_offset
    }

    pub fn palette_len(&self) -> usize {
        self.attributes.palette_len()
    }

    pub fn affine(&self) -> Option<AffineSlot> {
        self.binding.affine
    }

    pub fn flags(&self) -> ObjectFlags {
        self.attributes.flags
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.flags.contains(ObjectFlags::HIDDEN)
    }

    pub fn rotation(&self) -> i32 {
        self.attributes.rotation
    }

    pub fn scale(&self) -> (i32, i32) {
        (self.attributes.scale_x, self.attributes.scale_y)
    }

    /// Top-left corner in surface-local hardware coordinates.
    ///
    /// Logical Y grows upward from the bottom of the primary surface and
    /// addresses the sprite's centre; hardware Y grows downward from the top
    /// of each screen and addresses the corner.
    pub fn screen_position(&self) -> (i32, i32) {
        let x = self.attributes.x.wrapping_sub(self.width() / 2);
        let y = crate::SCREEN_HEIGHT - Surface::local_y(self.attributes.y) - self.height() / 2;
        (x, y)
    }

    pub(crate) fn object_attributes(&self) -> ObjectAttributes {
        let (x, y) = self.screen_position();
        ObjectAttributes {
            x,
            y,
            priority: self.attributes.priority,
            alpha: self.attributes.alpha,
            size: self.attributes.size,
            format: self.attributes.color_format,
            gfx: self.binding.gfx,
            affine: self.binding.affine,
            flags: self.attributes.flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PAL: [u16; 16] = [0; 16];

    fn sprite_at(x: i32, y: i32, size: SpriteSize) -> Sprite {
        Sprite {
            attributes: SpriteAttributes::new("s", x, y, &[], &PAL).with_size(size),
            binding: Binding {
                surface: Surface::for_y(y),
                slot: SlotId(0),
                gfx: GfxHandle { offset: 0, tile: 0 },
                palette_offset: 1,
                affine: None,
            },
        }
    }

    #[test]
    fn defaults() {
        let attrs = SpriteAttributes::new("Starship", 84, 16, &[], &PAL);
        assert_eq!(attrs.size, SpriteSize::Size32x32);
        assert_eq!(attrs.color_format, ColorFormat::Color256);
        assert_eq!(attrs.surface(), Surface::Primary);
        assert_eq!(attrs.palette_len(), 15);
        assert!(!attrs.has_transform());
        assert!(attrs.with_scale(512, 256).has_transform());
    }

    #[test]
    fn screen_position_flips_and_centres() {
        let s = sprite_at(84, 16, SpriteSize::Size32x32);
        assert_eq!(s.screen_position(), (68, 192 - 16 - 16));

        let planet = sprite_at(32, 384 - 32, SpriteSize::Size64x64);
        assert_eq!(planet.surface(), Surface::Secondary);
        assert_eq!(planet.screen_position(), (0, 192 - 160 - 32));
    }

    #[test]
    fn screen_position_wraps_past_the_top() {
        let s = sprite_at(0, 384 + 16, SpriteSize::Size32x32);
        assert_eq!(s.screen_position().1, 192 - 16 - 16);
    }
}
