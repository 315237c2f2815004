use core::fmt::{Debug, Formatter};

use log::{debug, info};

use crate::config::EngineConfig;
use crate::hardware::ObjectEngine;
use crate::pool::palette::PaletteReport;
use crate::registry::{SpriteId, SpriteRegistry};
use crate::sprite::Sprite;
use crate::surface::{Surface, SurfaceContext};

/// Owns both surfaces' pools, the live sprites and the hardware handle.
///
/// Lifecycle operations live in [`lifecycle`](crate::lifecycle), the
/// per-frame pass in [`frame`](crate::frame) and palette packing in
/// [`compactor`](crate::compactor).
pub struct SpriteEngine<H: ObjectEngine> {
    pub(crate) hardware: H,
    pub(crate) config: EngineConfig,
    pub(crate) surfaces: [SurfaceContext; 2],
    pub(crate) registry: SpriteRegistry,
}

impl<H: ObjectEngine> SpriteEngine<H> {
    /// Initialises both object engines and reserves palette entry 0 on each
    /// surface for the transparent colour.
    pub fn new(mut hardware: H, config: EngineConfig) -> Self {
        for surface in Surface::ALL {
            hardware.init(surface, config.mapping, config.extended_palette);
            hardware.upload_palette(surface, 0, &[config.transparent_color]);
        }
        info!("sprite engine ready, {:?}", config.mapping);

        Self {
            hardware,
            config,
            surfaces: [SurfaceContext::new(), SurfaceContext::new()],
            registry: SpriteRegistry::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn surface(&self, surface: Surface) -> &SurfaceContext {
        &self.surfaces[surface.index()]
    }

    /// Handle of the live sprite called `name`.
    pub fn get(&self, name: &str) -> Option<SpriteId> {
        self.registry.lookup(name)
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.registry.get(id)
    }

    pub fn sprite_by_name(&self, name: &str) -> Option<&Sprite> {
        self.registry.get(self.registry.lookup(name)?)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.registry.iter()
    }

    /// Live sprites bound to `surface`.
    pub fn sprites_on(&self, surface: Surface) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.registry.iter().filter(move |(_, s)| s.surface() == surface)
    }

    pub fn palette_report(&self, surface: Surface) -> PaletteReport {
        self.surfaces[surface.index()].palette.report()
    }

    /// Dumps both palette tables' occupancy at `debug` level.
    pub fn log_palette_offsets(&self) {
        for surface in Surface::ALL {
            let palette = &self.surfaces[surface.index()].palette;
            for (offset, id) in palette.regions() {
                if let Some(sprite) = self.registry.get(id) {
                    debug!(
                        "{} palette {:3}..{:3} {}",
                        surface,
                        offset,
                        offset + sprite.palette_len(),
                        sprite.name()
                    );
                }
            }
            debug!("{} {}", surface, palette.report());
        }
    }

    /// Blocks until the next vertical blank, the only point where a frame
    /// loop waits.
    pub fn wait_for_vblank(&mut self) {
        self.hardware.wait_for_vblank();
    }
}

impl<H: ObjectEngine> Debug for SpriteEngine<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpriteEngine")
            .field("config", &self.config)
            .field("surfaces", &self.surfaces)
            .field("sprites", &self.registry.len())
            .finish()
    }
}
