//! Object attribute memory encoding.
//!
//! Each object-table entry is four little-endian halfwords. The fourth one
//! belongs to the interleaved affine parameter table and is left alone here.
//!
//! | Word    | Bits  | Meaning                                               |
//! |---------|-------|-------------------------------------------------------|
//! | `attr0` | 0-7   | Y                                                     |
//! |         | 8     | affine enable                                         |
//! |         | 9     | double size (affine) / hidden (no affine)             |
//! |         | 10-11 | mode: normal, blended, window, bitmap                 |
//! |         | 12    | mosaic                                                |
//! |         | 13    | 256 colours                                           |
//! |         | 14-15 | shape                                                 |
//! | `attr1` | 0-8   | X                                                     |
//! |         | 9-13  | affine index (affine) / bit 12 hflip, bit 13 vflip    |
//! |         | 14-15 | size                                                  |
//! | `attr2` | 0-9   | tile index                                            |
//! |         | 10-11 | priority                                              |
//! |         | 12-15 | palette / alpha                                       |

use bit_field::BitField;
use bytemuck::{Pod, Zeroable};

use crate::hardware::GfxHandle;
use crate::pool::AffineSlot;

bitflags::bitflags! {
    /// Per-object visual flags.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ObjectFlags: u8 {
        const HIDDEN      = 0b0000_0001;
        const HFLIP       = 0b0000_0010;
        const VFLIP       = 0b0000_0100;
        const MOSAIC      = 0b0000_1000;
        /// Render an affine sprite into twice its bounding box so rotation
        /// doesn't clip the corners.
        const DOUBLE_SIZE = 0b0001_0000;
    }
}

/// Square size classes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SpriteSize {
    Size8x8,
    Size16x16,
    #[default]
    Size32x32,
    Size64x64,
}

impl SpriteSize {
    pub const fn width(self) -> i32 {
        match self {
            SpriteSize::Size8x8 => 8,
            SpriteSize::Size16x16 => 16,
            SpriteSize::Size32x32 => 32,
            SpriteSize::Size64x64 => 64,
        }
    }

    pub const fn height(self) -> i32 {
        self.width()
    }

    const fn size_bits(self) -> u16 {
        match self {
            SpriteSize::Size8x8 => 0,
            SpriteSize::Size16x16 => 1,
            SpriteSize::Size32x32 => 2,
            SpriteSize::Size64x64 => 3,
        }
    }

    /// Graphics memory one object of this size needs in `format`.
    pub const fn gfx_bytes(self, format: ColorFormat) -> usize {
        let pixels = (self.width() * self.height()) as usize;
        match format {
            ColorFormat::Color16 => pixels / 2,
            ColorFormat::Color256 => pixels,
            ColorFormat::Bitmap => pixels * 2,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// 4 bits per pixel, one 16-colour palette bank.
    Color16,
    /// 8 bits per pixel, indices into the full 256-entry table.
    #[default]
    Color256,
    /// 16-bit direct colour.
    Bitmap,
}

/// Decoded object state for one slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub x: i32,
    pub y: i32,
    pub priority: u8,
    pub alpha: u8,
    pub size: SpriteSize,
    pub format: ColorFormat,
    pub gfx: GfxHandle,
    pub affine: Option<AffineSlot>,
    pub flags: ObjectFlags,
}

/// One packed object-table entry.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct OamEntry {
    pub attr0: u16,
    pub attr1: u16,
    pub attr2: u16,
    pub affine_data: u16,
}

impl OamEntry {
    /// An entry the hardware skips.
    pub const fn hidden() -> Self {
        Self {
            attr0: 1 << 9,
            attr1: 0,
            attr2: 0,
            affine_data: 0,
        }
    }

    pub fn encode(obj: &ObjectAttributes) -> Self {
        let mut attr0 = 0u16;
        let mut attr1 = 0u16;
        let mut attr2 = 0u16;

        attr0.set_bits(0..8, (obj.y as u16) & 0xFF);
        attr1.set_bits(0..9, (obj.x as u16) & 0x1FF);

        // hiding wins over the affine binding, bit 9 can't mean both
        let hidden = obj.flags.contains(ObjectFlags::HIDDEN);
        match obj.affine {
            Some(affine) if !hidden => {
                attr0.set_bit(8, true);
                attr0.set_bit(9, obj.flags.contains(ObjectFlags::DOUBLE_SIZE));
                attr1.set_bits(9..14, affine.index() as u16);
            }
            _ => {
                attr0.set_bit(9, hidden);
                attr1.set_bit(12, obj.flags.contains(ObjectFlags::HFLIP));
                attr1.set_bit(13, obj.flags.contains(ObjectFlags::VFLIP));
            }
        }

        let mode = if obj.format == ColorFormat::Bitmap { 3 } else { 0 };
        attr0.set_bits(10..12, mode);
        attr0.set_bit(12, obj.flags.contains(ObjectFlags::MOSAIC));
        attr0.set_bit(13, obj.format == ColorFormat::Color256);
        // shape 0: square
        attr0.set_bits(14..16, 0);
        attr1.set_bits(14..16, obj.size.size_bits());

        attr2.set_bits(0..10, obj.gfx.tile & 0x3FF);
        attr2.set_bits(10..12, (obj.priority & 0b11) as u16);
        attr2.set_bits(12..16, (obj.alpha & 0b1111) as u16);

        Self {
            attr0,
            attr1,
            attr2,
            affine_data: 0,
        }
    }

    pub fn y(&self) -> u16 {
        self.attr0.get_bits(0..8)
    }

    pub fn x(&self) -> u16 {
        self.attr1.get_bits(0..9)
    }

    pub fn is_affine(&self) -> bool {
        self.attr0.get_bit(8)
    }

    pub fn is_hidden(&self) -> bool {
        !self.is_affine() && self.attr0.get_bit(9)
    }

    pub fn is_double_size(&self) -> bool {
        self.is_affine() && self.attr0.get_bit(9)
    }

    pub fn affine_index(&self) -> Option<u16> {
        self.is_affine().then(|| self.attr1.get_bits(9..14))
    }

    pub fn hflip(&self) -> bool {
        !self.is_affine() && self.attr1.get_bit(12)
    }

    pub fn vflip(&self) -> bool {
        !self.is_affine() && self.attr1.get_bit(13)
    }

    pub fn mosaic(&self) -> bool {
        self.attr0.get_bit(12)
    }

    pub fn is_256_color(&self) -> bool {
        self.attr0.get_bit(13)
    }

    pub fn size_bits(&self) -> u16 {
        self.attr1.get_bits(14..16)
    }

    pub fn tile(&self) -> u16 {
        self.attr2.get_bits(0..10)
    }

    pub fn priority(&self) -> u16 {
        self.attr2.get_bits(10..12)
    }

    pub fn alpha(&self) -> u16 {
        self.attr2.get_bits(12..16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj() -> ObjectAttributes {
        ObjectAttributes {
            x: 68,
            y: 160,
            priority: 2,
            alpha: 5,
            size: SpriteSize::Size32x32,
            format: ColorFormat::Color256,
            gfx: GfxHandle { offset: 0x400, tile: 32 },
            affine: None,
            flags: ObjectFlags::HFLIP | ObjectFlags::MOSAIC,
        }
    }

    #[test]
    fn packs_plain_object() {
        let e = OamEntry::encode(&obj());
        assert_eq!((e.x(), e.y()), (68, 160));
        assert_eq!(e.tile(), 32);
        assert_eq!(e.priority(), 2);
        assert_eq!(e.alpha(), 5);
        assert_eq!(e.size_bits(), 2);
        assert!(e.is_256_color());
        assert!(e.hflip() && !e.vflip());
        assert!(e.mosaic());
        assert!(!e.is_hidden());
        assert_eq!(e.affine_index(), None);
    }

    #[test]
    fn negative_positions_wrap_into_the_field() {
        let mut o = obj();
        o.x = -16;
        o.y = -16;
        let e = OamEntry::encode(&o);
        assert_eq!(e.x(), 512 - 16);
        assert_eq!(e.y(), 256 - 16);
    }

    #[test]
    fn affine_binding_replaces_flips() {
        let mut o = obj();
        o.affine = Some(AffineSlot(7));
        o.flags |= ObjectFlags::DOUBLE_SIZE;
        let e = OamEntry::encode(&o);
        assert_eq!(e.affine_index(), Some(7));
        assert!(e.is_double_size());
        assert!(!e.hflip());
    }

    #[test]
    fn hidden_overrides_affine() {
        let mut o = obj();
        o.affine = Some(AffineSlot(3));
        o.flags |= ObjectFlags::HIDDEN;
        let e = OamEntry::encode(&o);
        assert!(e.is_hidden());
        assert_eq!(e.affine_index(), None);
        assert!(OamEntry::hidden().is_hidden());
    }

    #[test]
    fn entry_is_eight_bytes() {
        assert_eq!(bytemuck::bytes_of(&OamEntry::default()).len(), 8);
        assert_eq!(SpriteSize::Size64x64.gfx_bytes(ColorFormat::Color256), 4096);
        assert_eq!(SpriteSize::Size8x8.gfx_bytes(ColorFormat::Color16), 32);
    }
}
