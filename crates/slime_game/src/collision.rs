//! Axis-aligned rectangles and the coarse sprite-occupancy check.
//!
//! All gameplay collision is AABB math done here rather than delegated to a
//! renderer. Coordinates are screen space: origin top-left, y grows downward,
//! so a body "lands" by being pushed toward smaller y.
//!
//! `CollisionMask` approximates a sprite's opaque core with a few
//! sub-rectangles expressed as fractions of the body box. It never samples
//! pixel data. Callers treat a mask error as "no opinion" and keep the plain
//! AABB answer.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// How far `self` penetrates `other` from each side. The smallest positive
/// value is the cheapest way out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapDepths {
    /// Distance to move `self` left (negative x) to clear `other`.
    pub left: f32,
    /// Distance to move `self` right (positive x).
    pub right: f32,
    /// Distance to move `self` up (negative y).
    pub up: f32,
    /// Distance to move `self` down (positive y).
    pub down: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAxis {
    Left,
    Right,
    Up,
    Down,
}

impl OverlapDepths {
    /// Minimum-penetration axis. Ties resolve in Up, Down, Left, Right order.
    pub fn min_axis(&self) -> (PushAxis, f32) {
        let mut best = (PushAxis::Up, self.up);
        for candidate in [
            (PushAxis::Down, self.down),
            (PushAxis::Left, self.left),
            (PushAxis::Right, self.right),
        ] {
            if candidate.1 < best.1 {
                best = candidate;
            }
        }
        best
    }
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn expanded(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + margin * 2.0,
            h: self.h + margin * 2.0,
        }
    }

    pub fn overlap_depths(&self, other: &Rect) -> Option<OverlapDepths> {
        if !self.intersects(other) {
            return None;
        }
        Some(OverlapDepths {
            left: self.right() - other.x,
            right: other.right() - self.x,
            up: self.bottom() - other.y,
            down: other.bottom() - self.y,
        })
    }

    /// Length of the shared vertical span, zero when disjoint.
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0)
    }

    /// Length of the shared horizontal span, zero when disjoint.
    pub fn horizontal_overlap(&self, other: &Rect) -> f32 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0.0)
    }
}

/// Fractional sub-rectangle of a body box; every field in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CoreRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollisionMask {
    pub enabled: bool,
    pub cores: Vec<CoreRect>,
}

impl Default for CollisionMask {
    fn default() -> Self {
        // Slime silhouette: a wide low body and a narrower dome on top.
        Self {
            enabled: false,
            cores: vec![
                CoreRect {
                    x: 0.1,
                    y: 0.5,
                    w: 0.8,
                    h: 0.5,
                },
                CoreRect {
                    x: 0.25,
                    y: 0.25,
                    w: 0.5,
                    h: 0.25,
                },
            ],
        }
    }
}

impl CollisionMask {
    /// Does any core sub-rectangle of `body` overlap `other`?
    pub fn check(&self, body: &Rect, other: &Rect) -> Result<bool, String> {
        if self.cores.is_empty() {
            return Err("Collision mask has no core rectangles".to_string());
        }
        if !(body.w > 0.0 && body.h > 0.0) {
            return Err(format!(
                "Collision mask applied to degenerate body {}x{}",
                body.w, body.h
            ));
        }
        let mut hit = false;
        for (i, core) in self.cores.iter().enumerate() {
            let in_unit = |v: f32| (0.0..=1.0).contains(&v);
            if !(in_unit(core.x)
                && in_unit(core.y)
                && in_unit(core.w)
                && in_unit(core.h)
                && core.x + core.w <= 1.0
                && core.y + core.h <= 1.0)
            {
                return Err(format!("Collision mask core {i} lies outside the unit box"));
            }
            let world = Rect {
                x: body.x + core.x * body.w,
                y: body.y + core.y * body.h,
                w: core.w * body.w,
                h: core.h * body.h,
            };
            hit |= world.intersects(other);
        }
        Ok(hit)
    }
}
