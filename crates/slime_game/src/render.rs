//! Renderer seam. The game never draws; it tells a `Renderer` where each
//! sprite should be and with which texture handle.

use std::collections::HashMap;

use crate::collision::Rect;

pub const PLATFORM_TEXTURE: &str = "tile_020";
pub const SIGN_TEXTURE: &str = "tile_052";
pub const CRATE_TEXTURE: &str = "crate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u32);

pub trait Renderer {
    fn spawn(&mut self, texture: &str, rect: Rect) -> SpriteHandle;
    fn place(&mut self, handle: SpriteHandle, texture: &str, rect: Rect);
    fn despawn(&mut self, handle: SpriteHandle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRecord {
    pub texture: String,
    pub rect: Rect,
}

/// Headless renderer: keeps the last placement of every live sprite.
#[derive(Debug, Default)]
pub struct LogRenderer {
    next_id: u32,
    sprites: HashMap<SpriteHandle, SpriteRecord>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.sprites.len()
    }

    #[allow(dead_code)]
    pub fn get(&self, handle: SpriteHandle) -> Option<&SpriteRecord> {
        self.sprites.get(&handle)
    }

    #[allow(dead_code)]
    pub fn count_texture(&self, texture: &str) -> usize {
        self.sprites
            .values()
            .filter(|record| record.texture == texture)
            .count()
    }
}

impl Renderer for LogRenderer {
    fn spawn(&mut self, texture: &str, rect: Rect) -> SpriteHandle {
        let handle = SpriteHandle(self.next_id);
        self.next_id += 1;
        log::trace!("spawn {:?} '{}' at ({}, {})", handle, texture, rect.x, rect.y);
        self.sprites.insert(
            handle,
            SpriteRecord {
                texture: texture.to_string(),
                rect,
            },
        );
        handle
    }

    fn place(&mut self, handle: SpriteHandle, texture: &str, rect: Rect) {
        match self.sprites.get_mut(&handle) {
            Some(record) => {
                if record.texture != texture {
                    record.texture = texture.to_string();
                }
                record.rect = rect;
            }
            None => log::warn!("place on unknown sprite {:?}", handle),
        }
    }

    fn despawn(&mut self, handle: SpriteHandle) {
        if self.sprites.remove(&handle).is_none() {
            log::warn!("despawn of unknown sprite {:?}", handle);
        }
    }
}
