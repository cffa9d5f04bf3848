//! Uniform-grid sprite sheets and a fixed-interval sheet player.
//!
//! Frames are numbered row-major: frame `i` lives at column `i % per_row`,
//! row `i / per_row`.

use serde::Serialize;

/// Source rectangle of one frame inside the sheet image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub frame_w: u32,
    pub frame_h: u32,
    pub per_row: u32,
    pub rows: u32,
}

impl SheetLayout {
    /// Derive the grid from the sheet's pixel size. Partial trailing cells are
    /// ignored.
    pub fn from_image_size(
        image_w: u32,
        image_h: u32,
        frame_w: u32,
        frame_h: u32,
    ) -> Result<Self, String> {
        if frame_w == 0 || frame_h == 0 {
            return Err("Sheet validation failed: frame size must be > 0".to_string());
        }
        let per_row = image_w / frame_w;
        let rows = image_h / frame_h;
        if per_row == 0 || rows == 0 {
            return Err(format!(
                "Sheet validation failed: {}x{} image holds no {}x{} frame",
                image_w, image_h, frame_w, frame_h
            ));
        }
        Ok(Self {
            frame_w,
            frame_h,
            per_row,
            rows,
        })
    }

    pub fn total_frames(&self) -> u32 {
        self.per_row * self.rows
    }

    pub fn source_rect(&self, frame: u32) -> FrameRect {
        let frame = frame % self.total_frames().max(1);
        let row = frame / self.per_row.max(1);
        let col = frame % self.per_row.max(1);
        FrameRect {
            x: col * self.frame_w,
            y: row * self.frame_h,
            w: self.frame_w,
            h: self.frame_h,
        }
    }
}

/// Steps through every frame of a sheet at a fixed wall-clock interval.
#[derive(Debug, Clone)]
pub struct SheetPlayer {
    pub layout: SheetLayout,
    pub frame: u32,
    pub interval_ms: u64,
    elapsed_ms: u64,
}

impl SheetPlayer {
    pub fn new(layout: SheetLayout, interval_ms: u64) -> Self {
        Self {
            layout,
            frame: 0,
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
        }
    }

    /// Advance by `dt_ms`; returns how many frames were stepped.
    pub fn tick(&mut self, dt_ms: u64) -> u32 {
        self.elapsed_ms += dt_ms;
        let mut stepped = 0;
        while self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            self.frame = (self.frame + 1) % self.layout.total_frames();
            stepped += 1;
        }
        stepped
    }

    pub fn current_rect(&self) -> FrameRect {
        self.layout.source_rect(self.frame)
    }
}
