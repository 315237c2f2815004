//! Procedurally drawn sprite sheets for the demo.
//!
//! Pixels are stored the way 1D-mapped 256-colour objects expect them:
//! 8x8 tiles of 64 bytes, tiles in row-major order.

use duo_core::{rgb15, ColorFormat, SpriteSize};

pub struct Sheet {
    pub size: SpriteSize,
    pub tiles: &'static [u8],
    pub palette: &'static [u16],
}

fn tiled_offset(size: SpriteSize, x: usize, y: usize) -> usize {
    let tiles_per_row = size.width() as usize / 8;
    let tile = (y / 8) * tiles_per_row + x / 8;
    tile * 64 + (y % 8) * 8 + x % 8
}

fn draw(size: SpriteSize, palette: Vec<u16>, pixel: impl Fn(i32, i32) -> u8) -> Sheet {
    let side = size.width();
    let mut tiles = vec![0u8; size.gfx_bytes(ColorFormat::Color256)];
    for y in 0..side {
        for x in 0..side {
            tiles[tiled_offset(size, x as usize, y as usize)] = pixel(x, y);
        }
    }
    Sheet {
        size,
        tiles: tiles.leak(),
        palette: palette.leak(),
    }
}

/// 32x32 arrow-shaped ship, 16 colours.
pub fn starship() -> Sheet {
    let mut palette = vec![duo_core::TRANSPARENT_COLOR];
    palette.extend((0..12).map(|i| rgb15(8 + i, 10 + i, 31)));
    palette.extend([rgb15(31, 20, 0), rgb15(31, 10, 0), rgb15(31, 31, 31)]);

    draw(SpriteSize::Size32x32, palette, |x, y| {
        let half_width = (31 - y) / 2;
        let dx = (x - 16).abs();
        if y < 2 || dx > half_width {
            0
        } else if y > 27 && dx < 4 {
            // exhaust
            13 + (x % 2) as u8
        } else if dx < 3 && (6..12).contains(&y) {
            15
        } else {
            1 + ((half_width - dx) as u8).min(11)
        }
    })
}

/// 64x64 banded planet, 16 colours.
pub fn planet() -> Sheet {
    let mut palette = vec![duo_core::TRANSPARENT_COLOR];
    palette.extend((0..15).map(|i| rgb15(6 + i, 4 + i / 2, 2 + i / 3)));

    draw(SpriteSize::Size64x64, palette, |x, y| {
        let (dx, dy) = (x - 32, y - 32);
        if dx * dx + dy * dy >= 30 * 30 {
            return 0;
        }
        let band = ((y + dx / 4) / 4).rem_euclid(8) as u8;
        let light = ((30 - (dx + dy).abs() / 3).max(0) / 5) as u8;
        1 + (band + light).min(14)
    })
}

/// Small filler sprite with a palette of `colors` entries.
pub fn debris(colors: u16) -> Sheet {
    let colors = colors.clamp(2, 16);
    let palette = (0..colors).map(|i| rgb15(i * 2, 31 - i * 2, i)).collect();
    draw(SpriteSize::Size8x8, palette, move |x, y| ((x + y) % colors as i32) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_fit(sheet: &Sheet) {
        let max = sheet.palette.len() as u8;
        assert!(sheet.tiles.iter().all(|&px| px < max));
        assert_eq!(sheet.tiles.len(), sheet.size.gfx_bytes(ColorFormat::Color256));
    }

    #[test]
    fn sheets_use_their_own_palettes() {
        assert_indices_fit(&starship());
        assert_indices_fit(&planet());
        assert_indices_fit(&debris(5));
        assert_eq!(starship().palette.len(), 16);
        assert_eq!(planet().palette.len(), 16);
    }

    #[test]
    fn tiles_are_row_major() {
        assert_eq!(tiled_offset(SpriteSize::Size32x32, 9, 0), 65);
        assert_eq!(tiled_offset(SpriteSize::Size32x32, 0, 8), 4 * 64);
    }
}
