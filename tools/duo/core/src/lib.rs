//! # duo-core
//!
//! Sprite resource management for a 2D object engine driving two display
//! surfaces (a "primary" and a "secondary" screen stacked vertically).
//!
//! Every surface has three hardware-limited pools:
//!
//! | Pool            | Capacity | Allocation                          |
//! |-----------------|----------|-------------------------------------|
//! | object slots    | 128      | first fit, lowest index wins        |
//! | affine slots    | 32       | first fit, allocated lazily         |
//! | palette entries | 256      | bump allocator + online compaction  |
//!
//! [`SpriteEngine`] layers named sprites on top of those pools. It creates and
//! destroys them, migrates them between surfaces as they move, keeps the
//! palette packed and pushes object attributes to hardware once per frame.
//!
//! The hardware itself sits behind the [`ObjectEngine`] trait.
//! [`hardware::sim::SimEngine`] is an in-memory implementation used by the
//! tests and the demo driver.
//!
//! ## Threading
//!
//! Everything runs on one thread between vertical blanks. All mutating calls
//! take `&mut SpriteEngine`, so resource mutation can never interleave with
//! [`SpriteEngine::update_all`]; keep them on the same tick, before the flush.
//!
//! ```ignore
//! let mut engine = SpriteEngine::new(SimEngine::default(), EngineConfig::default());
//! let ship = engine.create(SpriteAttributes::new("Starship", 84, 16, SHIP_TILES, SHIP_PAL))?;
//!
//! loop {
//!     engine.move_by(ship, 0, 3)?;
//!     engine.update_all();
//!     engine.wait_for_vblank();
//! }
//! ```
#![no_std]
extern crate alloc;

pub mod compactor;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod hardware;
pub mod lifecycle;
pub mod pool;
pub mod registry;
pub mod sprite;
pub mod surface;

pub use compactor::Compaction;
pub use config::{EngineConfig, SpriteMapping};
pub use engine::SpriteEngine;
pub use error::SpriteError;
pub use hardware::oam::{ColorFormat, ObjectFlags, OamEntry, SpriteSize};
pub use hardware::{GfxHandle, ObjectEngine};
pub use pool::palette::PaletteReport;
pub use pool::{AffineSlot, SlotId};
pub use registry::SpriteId;
pub use sprite::{Sprite, SpriteAttributes};
pub use surface::{Surface, SurfaceContext};

/// Object slots per surface.
pub const SPRITE_COUNT: usize = 128;
/// Palette entries per surface.
pub const PALETTE_LEN: usize = 256;
/// Affine (rotation/scale) parameter slots per surface.
pub const AFFINE_COUNT: usize = 32;
/// Largest palette a single sprite is expected to bring, including the
/// transparent entry. Used as headroom by the end-of-frame compaction check.
pub const MAX_SPRITE_PALETTE_LEN: usize = 16;

pub const SCREEN_WIDTH: i32 = 256;
pub const SCREEN_HEIGHT: i32 = 192;
/// Height of the combined coordinate space: primary below, secondary above.
pub const WORLD_HEIGHT: i32 = SCREEN_HEIGHT * 2;

/// 1.0 in the 8.8 fixed point format used for sprite scale.
pub const SCALE_ONE: i32 = 1 << 8;

/// Packs a 5-bit-per-channel colour.
pub const fn rgb15(r: u16, g: u16, b: u16) -> u16 {
    (r & 31) | ((g & 31) << 5) | ((b & 31) << 10)
}

/// Colour written to palette entry 0 of both surfaces.
pub const TRANSPARENT_COLOR: u16 = rgb15(31, 0, 31);

/// Converts degrees to the hardware's 15-bit angle (32768 units per turn).
pub const fn degrees_to_angle(degrees: i32) -> i16 {
    (degrees.rem_euclid(360) * 32768 / 360) as i16
}
