use duo_core::{ObjectEngine, SpriteAttributes, SpriteEngine, SpriteId, SCREEN_WIDTH, WORLD_HEIGHT};
use tracing::{debug, warn};

use crate::assets;
use crate::input::{Buttons, Gamepad};

const SHIP_SPEED: i32 = 3;
/// Debris sprites kept alive at once when churning.
const DEBRIS_ALIVE: u32 = 12;

/// The starship/planet scene driven one frame at a time.
pub struct Demo<H: ObjectEngine> {
    pub engine: SpriteEngine<H>,
    ship_attributes: SpriteAttributes,
    ship: Option<SpriteId>,
    planet: Option<SpriteId>,
    planet_direction: i32,
    gamepad: Gamepad,
    /// One sheet per palette size, `2..=16` colours, built once.
    debris: Vec<assets::Sheet>,
    churn: bool,
    frame: u32,
}

impl<H: ObjectEngine> Demo<H> {
    pub fn new(mut engine: SpriteEngine<H>, churn: bool) -> anyhow::Result<Self> {
        let ship = assets::starship();
        let ship_attributes =
            SpriteAttributes::new("Starship", 84, 16, ship.tiles, ship.palette).with_size(ship.size);
        let ship = engine.create(ship_attributes.clone())?;

        let planet = assets::planet();
        let planet = engine.create(
            SpriteAttributes::new("Planet", 32, WORLD_HEIGHT - 32, planet.tiles, planet.palette)
                .with_size(planet.size),
        )?;

        Ok(Self {
            engine,
            ship_attributes,
            ship: Some(ship),
            planet: Some(planet),
            planet_direction: 2,
            gamepad: Gamepad::default(),
            debris: if churn { (2..=16).map(assets::debris).collect() } else { Vec::new() },
            churn,
            frame: 0,
        })
    }

    pub fn ship(&self) -> Option<SpriteId> {
        self.ship
    }

    /// Runs one frame with `buttons` held, ending at the vertical blank.
    pub fn tick(&mut self, buttons: u8) {
        self.gamepad.feed(buttons);
        self.steer_ship();

        if self.gamepad.just_pressed(Buttons::A) && self.ship.is_some() {
            self.ship = self.engine.destroy(&self.ship_attributes.name);
        }
        if self.gamepad.just_pressed(Buttons::B) && self.ship.is_none() {
            match self.engine.create(self.ship_attributes.clone()) {
                Ok(ship) => self.ship = Some(ship),
                Err(err) => warn!("couldn't respawn the ship: {}", err),
            }
        }

        self.bounce_planet();
        if self.churn {
            self.churn_debris();
        }

        self.engine.update_all();
        self.engine.wait_for_vblank();
        self.frame += 1;
    }

    fn steer_ship(&mut self) {
        let Some(ship) = self.ship else {
            return;
        };

        let pad = &self.gamepad;
        let mut delta = (0, 0);
        if pad.is_pressed(Buttons::Left) {
            delta.0 -= SHIP_SPEED;
        }
        if pad.is_pressed(Buttons::Right) {
            delta.0 += SHIP_SPEED;
        }
        if pad.is_pressed(Buttons::Up) {
            delta.1 += SHIP_SPEED;
        }
        if pad.is_pressed(Buttons::Down) {
            delta.1 -= SHIP_SPEED;
        }

        if delta != (0, 0) {
            if let Err(err) = self.engine.move_by(ship, delta.0, delta.1) {
                warn!("ship stays put: {}", err);
            }
        }
    }

    fn bounce_planet(&mut self) {
        let Some(planet) = self.planet else {
            return;
        };
        if let Err(err) = self.engine.move_by(planet, self.planet_direction, 0) {
            warn!("planet stays put: {}", err);
            return;
        }
        let x = self.engine.sprite(planet).map_or(0, |p| p.x());
        if !(32..=SCREEN_WIDTH - 32).contains(&x) {
            self.planet_direction = -self.planet_direction;
        }
    }

    /// Spawns a small sprite every fourth frame and drops the oldest one,
    /// punching holes into both palettes.
    fn churn_debris(&mut self) {
        if self.frame % 4 != 0 {
            return;
        }
        let n = self.frame / 4;
        if n >= DEBRIS_ALIVE {
            self.engine.destroy(&format!("Debris {}", n - DEBRIS_ALIVE));
        }

        let sheet = &self.debris[(n * 7 % 15) as usize];
        let x = (n as i32 * 53).rem_euclid(SCREEN_WIDTH);
        let y = (n as i32 * 37).rem_euclid(WORLD_HEIGHT);
        let attributes = SpriteAttributes::new(format!("Debris {}", n), x, y, sheet.tiles, sheet.palette)
            .with_size(sheet.size);
        if let Err(err) = self.engine.create(attributes) {
            debug!("no debris this frame: {}", err);
        }
    }
}
