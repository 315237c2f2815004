//! Live sprites, stored in an arena and indexed by name.
//!
//! Handles are generational: destroying a sprite bumps its slot's generation,
//! so an old [`SpriteId`] can never reach whichever sprite reuses the slot.

use alloc::string::String;
use alloc::vec::Vec;

use heapless::FnvIndexMap;

use crate::sprite::Sprite;
use crate::SPRITE_COUNT;

/// Upper bound on live sprites across both surfaces.
pub const MAX_SPRITES: usize = SPRITE_COUNT * 2;

/// Stable handle to a live sprite.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId {
    index: u16,
    generation: u16,
}

impl SpriteId {
    pub(crate) const fn new(index: u16, generation: u16) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u16,
    sprite: Option<Sprite>,
}

#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    entries: Vec<Entry>,
    free: Vec<u16>,
    names: FnvIndexMap<String, SpriteId, MAX_SPRITES>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<SpriteId> {
        self.names.get(name).copied()
    }

    /// Stores a sprite. Hands the sprite back if the registry is full or the
    /// name is already taken.
    pub fn insert(&mut self, sprite: Sprite) -> Result<SpriteId, Sprite> {
        if self.names.len() >= MAX_SPRITES || self.contains_name(sprite.name()) {
            return Err(sprite);
        }

        let id = match self.free.pop() {
            Some(index) => SpriteId::new(index, self.entries[index as usize].generation),
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    sprite: None,
                });
                SpriteId::new((self.entries.len() - 1) as u16, 0)
            }
        };

        if self.names.insert(String::from(sprite.name()), id).is_err() {
            self.free.push(id.index);
            return Err(sprite);
        }
        self.entries[id.index()].sprite = Some(sprite);
        Ok(id)
    }

    pub fn remove(&mut self, id: SpriteId) -> Option<Sprite> {
        let entry = self.entries.get_mut(id.index())?;
        if entry.generation != id.generation {
            return None;
        }
        let sprite = entry.sprite.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        self.names.remove(sprite.name());
        Some(sprite)
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        let entry = self.entries.get(id.index())?;
        if entry.generation != id.generation {
            return None;
        }
        entry.sprite.as_ref()
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        let entry = self.entries.get_mut(id.index())?;
        if entry.generation != id.generation {
            return None;
        }
        entry.sprite.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteId, &Sprite)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .sprite
                .as_ref()
                .map(|sprite| (SpriteId::new(index as u16, entry.generation), sprite))
        })
    }
}
