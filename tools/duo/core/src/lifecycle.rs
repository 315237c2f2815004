//! Creating, destroying, moving and transforming sprites.
//!
//! Creation checks every pool before it takes anything, so a failed
//! [`create`](SpriteEngine::create) leaves no partial allocation behind.
//! Moving a sprite across the boundary between the surfaces rebuilds it on
//! the other surface with fresh resources; its handle stays valid.

use log::{debug, info, warn};

use crate::compactor::shift_gfx;
use crate::error::SpriteError;
use crate::hardware::oam::{ColorFormat, ObjectFlags};
use crate::hardware::{GfxHandle, ObjectEngine};
use crate::pool::AffineSlot;
use crate::registry::SpriteId;
use crate::sprite::{Binding, Sprite, SpriteAttributes};
use crate::surface::Surface;
use crate::{degrees_to_angle, SpriteEngine, SCALE_ONE};

impl<H: ObjectEngine> SpriteEngine<H> {
    /// Builds a sprite on the surface its `y` belongs to.
    ///
    /// Uploads the tiles into fresh graphics memory, the palette (minus its
    /// transparent entry 0) into a region at the surface's high-water mark,
    /// and rebases the uploaded pixel indices onto that region. Compacts the
    /// palette first if the region doesn't fit.
    pub fn create(&mut self, attributes: SpriteAttributes) -> Result<SpriteId, SpriteError> {
        if attributes.color_format != ColorFormat::Color256 {
            warn!("sprite {} is not a 256-colour sprite", attributes.name);
            return Err(SpriteError::UnsupportedColorFormat(
                attributes.name,
                attributes.color_format,
            ));
        }
        if self.registry.contains_name(&attributes.name) {
            warn!("sprite with name {} already exists", attributes.name);
            return Err(SpriteError::DuplicateName(attributes.name));
        }

        let surface = attributes.surface();
        let len = attributes.palette_len();
        let binding = self.acquire(&attributes, surface, attributes.has_transform())?;

        match self.registry.insert(Sprite { attributes, binding }) {
            Ok(id) => {
                self.surfaces[surface.index()]
                    .palette
                    .assign_owner(binding.palette_offset, len, id);
                Ok(id)
            }
            Err(sprite) => {
                warn!("sprite registry is full, dropping {}", sprite.name());
                self.release(&binding, len);
                Err(SpriteError::SlotPoolFull(surface))
            }
        }
    }

    /// Destroys the sprite called `name` and releases everything it held.
    ///
    /// The palette entries are freed but not compacted. Always returns
    /// `None`, so a handle can be overwritten with the result unconditionally.
    pub fn destroy(&mut self, name: &str) -> Option<SpriteId> {
        // unknown names are already logged
        let _ = self.try_destroy(name);
        None
    }

    /// Like [`destroy`](Self::destroy), but reports an unknown name.
    pub fn try_destroy(&mut self, name: &str) -> Result<(), SpriteError> {
        let Some(sprite) = self
            .registry
            .lookup(name)
            .and_then(|id| self.registry.remove(id))
        else {
            warn!("no sprite named {} to destroy", name);
            return Err(SpriteError::NotFound(name.into()));
        };

        self.release(&sprite.binding, sprite.palette_len());
        debug!("destroyed {} on {} surface", name, sprite.surface());
        Ok(())
    }

    pub fn move_to(&mut self, id: SpriteId, x: i32, y: i32) -> Result<(), SpriteError> {
        let sprite = self.registry.get_mut(id).ok_or(SpriteError::StaleHandle)?;
        let previous = (sprite.attributes.x, sprite.attributes.y);
        sprite.attributes.x = x;
        sprite.attributes.y = y;
        self.migrate_if_needed(id, previous)
    }

    pub fn move_by(&mut self, id: SpriteId, dx: i32, dy: i32) -> Result<(), SpriteError> {
        let sprite = self.registry.get(id).ok_or(SpriteError::StaleHandle)?;
        let (x, y) = (sprite.x().wrapping_add(dx), sprite.y().wrapping_add(dy));
        self.move_to(id, x, y)
    }

    /// Adds `degrees` to the sprite's rotation, kept in `0..360`.
    pub fn rotate(&mut self, id: SpriteId, degrees: i32) -> Result<(), SpriteError> {
        self.ensure_affine(id)?;
        let sprite = self.registry.get_mut(id).ok_or(SpriteError::StaleHandle)?;
        sprite.attributes.rotation =
            (sprite.attributes.rotation.rem_euclid(360) + degrees.rem_euclid(360)).rem_euclid(360);
        debug!("{} rotation {} degrees", sprite.name(), sprite.attributes.rotation);
        self.apply_transform(id);
        Ok(())
    }

    /// Multiplies the sprite's scale per axis by 8.8 fixed point factors.
    pub fn scale(&mut self, id: SpriteId, scale_x: i32, scale_y: i32) -> Result<(), SpriteError> {
        self.ensure_affine(id)?;
        let sprite = self.registry.get_mut(id).ok_or(SpriteError::StaleHandle)?;
        sprite.attributes.scale_x = fixed_mul(sprite.attributes.scale_x, scale_x);
        sprite.attributes.scale_y = fixed_mul(sprite.attributes.scale_y, scale_y);
        self.apply_transform(id);
        Ok(())
    }

    pub fn scale_x(&mut self, id: SpriteId, factor: i32) -> Result<(), SpriteError> {
        self.scale(id, factor, SCALE_ONE)
    }

    pub fn scale_y(&mut self, id: SpriteId, factor: i32) -> Result<(), SpriteError> {
        self.scale(id, SCALE_ONE, factor)
    }

    pub fn hide(&mut self, id: SpriteId) -> Result<(), SpriteError> {
        self.set_flag(id, ObjectFlags::HIDDEN, true)
    }

    pub fn show(&mut self, id: SpriteId) -> Result<(), SpriteError> {
        self.set_flag(id, ObjectFlags::HIDDEN, false)
    }

    pub fn set_flag(&mut self, id: SpriteId, flag: ObjectFlags, value: bool) -> Result<(), SpriteError> {
        let sprite = self.registry.get_mut(id).ok_or(SpriteError::StaleHandle)?;
        sprite.attributes.flags.set(flag, value);
        Ok(())
    }

    /// Takes a slot, graphics memory, a palette region and optionally an
    /// affine slot on `surface`, and uploads the sprite's data into them.
    ///
    /// All checks happen before the first resource is taken.
    fn acquire(
        &mut self,
        attributes: &SpriteAttributes,
        surface: Surface,
        wants_affine: bool,
    ) -> Result<Binding, SpriteError> {
        let name = &attributes.name;
        let len = attributes.palette_len();

        if self.surfaces[surface.index()].is_full() {
            warn!("{} object table is full, can't place {}", surface, name);
            return Err(SpriteError::SlotPoolFull(surface));
        }

        if !self.surfaces[surface.index()].palette.can_fit(len) {
            self.compact(surface);
        }

        let ctx = &self.surfaces[surface.index()];
        if !ctx.palette.can_fit(len) {
            warn!("palette full for sprite {} on {} surface", name, surface);
            return Err(SpriteError::PaletteFull {
                name: name.clone(),
                surface,
                needed: len,
                available: ctx.palette.remaining(),
            });
        }
        if wants_affine && ctx.affine.is_full() {
            warn!("{} affine slots are exhausted, can't place {}", surface, name);
            return Err(SpriteError::AffinePoolFull(surface));
        }

        let Some(gfx) = self
            .hardware
            .allocate_gfx(surface, attributes.size, attributes.color_format)
        else {
            warn!("no graphics memory for {} on {} surface", name, surface);
            return Err(SpriteError::GraphicsMemoryFull(surface));
        };

        let ctx = &mut self.surfaces[surface.index()];
        let Some(slot) = ctx.allocate_slot() else {
            self.hardware.free_gfx(surface, gfx);
            return Err(SpriteError::SlotPoolFull(surface));
        };
        let Some(palette_offset) = ctx.palette.reserve(len) else {
            ctx.release_slot(slot);
            self.hardware.free_gfx(surface, gfx);
            return Err(SpriteError::PaletteFull {
                name: name.clone(),
                surface,
                needed: len,
                available: ctx.palette.remaining(),
            });
        };
        let affine = if wants_affine { ctx.allocate_affine() } else { None };

        self.upload_tiles(surface, gfx, attributes.tiles);
        if len > 0 {
            self.hardware
                .upload_palette(surface, palette_offset, &attributes.palette[1..]);
        }
        // source index k lands on table entry offset + k - 1
        shift_gfx(&mut self.hardware, surface, gfx, palette_offset as i32 - 1);

        if let Some(affine) = affine {
            self.hardware.set_affine(
                surface,
                affine,
                degrees_to_angle(attributes.rotation),
                attributes.scale_x,
                attributes.scale_y,
            );
        }

        debug!(
            "{} on {} surface: slot {}, palette {}..{}, tile {}",
            name,
            surface,
            slot.index(),
            palette_offset,
            palette_offset + len,
            gfx.tile
        );

        Ok(Binding {
            surface,
            slot,
            gfx,
            palette_offset,
            affine,
        })
    }

    /// Gives everything in `binding` back to its surface and the hardware.
    fn release(&mut self, binding: &Binding, palette_len: usize) {
        let ctx = &mut self.surfaces[binding.surface.index()];
        ctx.release_slot(binding.slot);
        if let Some(affine) = binding.affine {
            ctx.release_affine(affine);
        }
        ctx.palette.release(binding.palette_offset, palette_len);

        self.hardware.free_gfx(binding.surface, binding.gfx);
        self.hardware.clear_object(binding.surface, binding.slot);
    }

    fn upload_tiles(&mut self, surface: Surface, gfx: GfxHandle, tiles: &[u8]) {
        let Some(words) = self.hardware.gfx_mut(surface, gfx) else {
            warn!("{} graphics block at {:#x} vanished", surface, gfx.offset);
            return;
        };
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(words);
        if tiles.len() > bytes.len() {
            warn!("{} tile bytes don't fit in {}, truncating", tiles.len(), bytes.len());
        }
        let n = tiles.len().min(bytes.len());
        bytes[..n].copy_from_slice(&tiles[..n]);
        bytes[n..].fill(0);
    }

    /// Rebuilds the sprite on the other surface once its position has
    /// crossed over. On failure the sprite keeps its old surface and
    /// `previous` position.
    fn migrate_if_needed(&mut self, id: SpriteId, previous: (i32, i32)) -> Result<(), SpriteError> {
        let sprite = self.registry.get(id).ok_or(SpriteError::StaleHandle)?;
        let from = sprite.surface();
        let to = sprite.attributes.surface();
        if from == to {
            return Ok(());
        }

        let attributes = sprite.attributes.clone();
        let old = sprite.binding;
        let wants_affine = old.affine.is_some() || attributes.has_transform();
        let len = attributes.palette_len();

        match self.acquire(&attributes, to, wants_affine) {
            Ok(binding) => {
                self.release(&old, len);
                self.surfaces[to.index()]
                    .palette
                    .assign_owner(binding.palette_offset, len, id);
                if let Some(sprite) = self.registry.get_mut(id) {
                    sprite.binding = binding;
                }
                info!("{} moved from {} to {} surface", attributes.name, from, to);
                Ok(())
            }
            Err(err) => {
                if let Some(sprite) = self.registry.get_mut(id) {
                    (sprite.attributes.x, sprite.attributes.y) = previous;
                }
                warn!("{} stays on {} surface: {}", attributes.name, from, err);
                Err(err)
            }
        }
    }

    fn ensure_affine(&mut self, id: SpriteId) -> Result<AffineSlot, SpriteError> {
        let sprite = self.registry.get_mut(id).ok_or(SpriteError::StaleHandle)?;
        if let Some(affine) = sprite.binding.affine {
            return Ok(affine);
        }

        let surface = sprite.binding.surface;
        let Some(affine) = self.surfaces[surface.index()].allocate_affine() else {
            warn!("{} affine slots are exhausted, {} can't transform", surface, sprite.name());
            return Err(SpriteError::AffinePoolFull(surface));
        };
        sprite.binding.affine = Some(affine);
        debug!("new affine slot {} on {} surface for {}", affine.index(), surface, sprite.name());
        Ok(affine)
    }

    fn apply_transform(&mut self, id: SpriteId) {
        let Some(sprite) = self.registry.get(id) else {
            return;
        };
        if let Some(affine) = sprite.binding.affine {
            self.hardware.set_affine(
                sprite.binding.surface,
                affine,
                degrees_to_angle(sprite.attributes.rotation),
                sprite.attributes.scale_x,
                sprite.attributes.scale_y,
            );
        }
    }
}

/// `(a * b) >> 8` in 8.8 fixed point, saturating at the `i32` range.
fn fixed_mul(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64) >> 8).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
