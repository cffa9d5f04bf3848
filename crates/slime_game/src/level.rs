//! Tile grid holding static level geometry.
//!
//! The grid is the only owner of tile data. Platforms, signs and crate spawn
//! points are derived views recomputed by a full row-major scan; nothing keeps
//! them incrementally in sync. Consumers compare [`Level::revision`] to know
//! when a rebuild is due.
//!
//! Persistence format: `{"width": W, "height": H, "data": [[tag, ...], ...]}`
//! with integer tags. Loading fails closed and leaves the current grid intact.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::collision::Rect;
use crate::interaction::Sign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TileTag {
    #[default]
    Empty,
    Platform,
    Sign,
    Crate,
}

impl TryFrom<u8> for TileTag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TileTag::Empty),
            1 => Ok(TileTag::Platform),
            2 => Ok(TileTag::Sign),
            3 => Ok(TileTag::Crate),
            other => Err(format!("unknown tile tag {other}")),
        }
    }
}

impl From<TileTag> for u8 {
    fn from(tag: TileTag) -> u8 {
        match tag {
            TileTag::Empty => 0,
            TileTag::Platform => 1,
            TileTag::Sign => 2,
            TileTag::Crate => 3,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelFile {
    width: usize,
    height: usize,
    data: Vec<Vec<TileTag>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    width: usize,
    height: usize,
    tiles: Vec<TileTag>,
    revision: u64,
}

impl Level {
    pub const SAMPLE_WIDTH: usize = 25;
    pub const SAMPLE_HEIGHT: usize = 15;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileTag::Empty; width * height],
            revision: 0,
        }
    }

    /// Demo level: a platform row three tiles above the bottom with a gap at
    /// the seventh tile, one crate, and five signs.
    pub fn sample() -> Self {
        let mut level = Self::new(Self::SAMPLE_WIDTH, Self::SAMPLE_HEIGHT);
        let platform_row = Self::SAMPLE_HEIGHT as i32 - 3;
        for x in 0..Self::SAMPLE_WIDTH as i32 {
            level.set_tile(x, platform_row, TileTag::Platform);
        }
        level.set_tile(6, platform_row, TileTag::Empty);
        level.set_tile(4, platform_row - 1, TileTag::Crate);
        for x in [1, 10, 15, 17, 20] {
            level.set_tile(x, platform_row - 1, TileTag::Sign);
        }
        level
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bumped on every successful mutation or load.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    #[allow(dead_code)]
    pub fn tile_at(&self, x: i32, y: i32) -> TileTag {
        self.index(x, y)
            .map(|i| self.tiles[i])
            .unwrap_or(TileTag::Empty)
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tag: TileTag) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        self.tiles[i] = tag;
        self.revision += 1;
        true
    }

    /// Row-major scan yielding the world rect of every cell tagged `tag`.
    fn scan(&self, tag: TileTag, tile_size: i32) -> impl Iterator<Item = Rect> + '_ {
        let size = tile_size as f32;
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, t)| **t == tag)
            .map(move |(i, _)| {
                let (wx, wy) = grid_to_world((i % self.width) as i32, (i / self.width) as i32, tile_size);
                Rect::new(wx as f32, wy as f32, size, size)
            })
    }

    pub fn platforms(&self, tile_size: i32) -> Vec<Rect> {
        self.scan(TileTag::Platform, tile_size).collect()
    }

    /// Signs in scan order; `todo_index` wraps over `todo_len` entries.
    pub fn signs(&self, tile_size: i32, todo_len: usize) -> Vec<Sign> {
        self.scan(TileTag::Sign, tile_size)
            .enumerate()
            .map(|(order, rect)| Sign {
                rect,
                todo_index: order % todo_len.max(1),
            })
            .collect()
    }

    pub fn crate_spawns(&self, tile_size: i32) -> Vec<Rect> {
        self.scan(TileTag::Crate, tile_size).collect()
    }

    pub fn to_json(&self) -> Result<String, String> {
        let file = LevelFile {
            width: self.width,
            height: self.height,
            data: self.tiles.chunks(self.width.max(1)).map(<[TileTag]>::to_vec).collect(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| format!("Failed to encode level: {e}"))
    }

    /// Replace the grid from JSON. On any error the current grid is kept.
    pub fn load_from_str(&mut self, raw: &str) -> Result<(), String> {
        let file: LevelFile =
            serde_json::from_str(raw).map_err(|e| format!("Failed to parse level JSON: {e}"))?;
        validate_level_file(&file)?;

        self.width = file.width;
        self.height = file.height;
        self.tiles = file.data.into_iter().flatten().collect();
        self.revision += 1;
        log::info!("Loaded level data: {} x {}", self.width, self.height);
        Ok(())
    }
}

fn validate_level_file(file: &LevelFile) -> Result<(), String> {
    if file.width == 0 || file.height == 0 {
        return Err("Level validation failed: width and height must be > 0".to_string());
    }
    if file.data.len() != file.height {
        return Err(format!(
            "Level validation failed: expected {} rows, found {}",
            file.height,
            file.data.len()
        ));
    }
    for (y, row) in file.data.iter().enumerate() {
        if row.len() != file.width {
            return Err(format!(
                "Level validation failed: row {} has {} cells, expected {}",
                y,
                row.len(),
                file.width
            ));
        }
    }
    Ok(())
}

pub fn load_level_from_path(path: &Path) -> Result<Level, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let mut level = Level::new(0, 0);
    level
        .load_from_str(&raw)
        .map_err(|e| format!("{} ({})", e, path.display()))?;
    Ok(level)
}

/// Floor division, so negative world coordinates map to negative cells.
pub fn world_to_grid(world_x: f32, world_y: f32, tile_size: i32) -> (i32, i32) {
    let size = tile_size as f32;
    ((world_x / size).floor() as i32, (world_y / size).floor() as i32)
}

pub fn grid_to_world(grid_x: i32, grid_y: i32, tile_size: i32) -> (i32, i32) {
    (grid_x.saturating_mul(tile_size), grid_y.saturating_mul(tile_size))
}
