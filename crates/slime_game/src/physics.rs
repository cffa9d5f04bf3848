//! Per-tick physics for the player and pushable crates.
//!
//! Units are pixels and ticks: velocities are pixels per tick and gravity is
//! added once per tick, so the step assumes the host's constant tick rate.
//!
//! Resolution is axis-separated and order-dependent: the player resolves
//! against platforms before crates, the horizontal clamp runs before the floor
//! clamp, and crates step one after another against the already-moved state
//! of earlier crates. There is no impulse solver and no rotation. Fast bodies
//! can tunnel through thin geometry.

use glam::Vec2;
use serde::Deserialize;

use crate::collision::{CollisionMask, PushAxis, Rect};
use crate::controller::{FrameInput, Player, PlayerEvents, StepContext};
use crate::render::SpriteHandle;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_speed: f32,
    /// Negative: up is toward smaller y.
    pub jump_impulse: f32,
    pub dodge_ticks: u32,
    pub dodge_recharge_ticks: u32,
    pub dodge_speed_multiplier: f32,
    pub crate_gravity_scale: f32,
    pub push_accel: f32,
    pub crate_max_speed: f32,
    /// Multiplier applied to crate velocity each tick nobody pushes it.
    pub crate_friction: f32,
    pub crate_rest_threshold: f32,
    /// Fraction of the shorter body that must overlap vertically for a push.
    pub push_band: f32,
    /// Horizontal gap (px) still counted as contact when pushing.
    pub push_reach: f32,
    /// Downward-travel tolerance (px) for a crate settling onto a support.
    pub rest_tolerance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            move_speed: 4.0,
            jump_impulse: -12.0,
            dodge_ticks: 24,
            dodge_recharge_ticks: 120,
            dodge_speed_multiplier: 2.0,
            crate_gravity_scale: 0.5,
            push_accel: 0.25,
            crate_max_speed: 3.0,
            crate_friction: 0.8,
            crate_rest_threshold: 0.05,
            push_band: 0.5,
            push_reach: 1.0,
            rest_tolerance: 4.0,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err("Physics validation failed: gravity must be >= 0".to_string());
        }
        if !(self.move_speed.is_finite() && self.move_speed >= 0.0) {
            return Err("Physics validation failed: move_speed must be >= 0".to_string());
        }
        if !(self.jump_impulse.is_finite() && self.jump_impulse < 0.0) {
            return Err("Physics validation failed: jump_impulse must be < 0".to_string());
        }
        for (name, value) in [
            ("dodge_speed_multiplier", self.dodge_speed_multiplier),
            ("crate_gravity_scale", self.crate_gravity_scale),
            ("push_accel", self.push_accel),
            ("crate_max_speed", self.crate_max_speed),
            ("crate_rest_threshold", self.crate_rest_threshold),
            ("push_reach", self.push_reach),
            ("rest_tolerance", self.rest_tolerance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("Physics validation failed: {name} must be >= 0"));
            }
        }
        if !(0.0..=1.0).contains(&self.crate_friction) {
            return Err("Physics validation failed: crate_friction must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.push_band) {
            return Err("Physics validation failed: push_band must be in [0, 1]".to_string());
        }
        Ok(())
    }
}

/// Playable area in world pixels: x in `[0, width]`, floor at `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn from_grid(width_tiles: usize, height_tiles: usize, tile_size: i32) -> Self {
        Self {
            width: width_tiles as f32 * tile_size as f32,
            height: height_tiles as f32 * tile_size as f32,
        }
    }
}

/// Position/velocity/size record shared by every movable body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
}

impl KinematicBody {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
        }
    }

    pub fn aabb(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Hard stop at the side walls; velocity is left alone.
    pub fn clamp_horizontal(&mut self, bounds: WorldBounds) -> bool {
        let max_x = (bounds.width - self.size.x).max(0.0);
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            true
        } else if self.pos.x > max_x {
            self.pos.x = max_x;
            true
        } else {
            false
        }
    }

    /// Rest on the world floor. Sets `grounded` when it fires.
    pub fn clamp_floor(&mut self, bounds: WorldBounds) -> bool {
        if self.pos.y + self.size.y > bounds.height {
            self.pos.y = bounds.height - self.size.y;
            self.vel.y = 0.0;
            self.grounded = true;
            true
        } else {
            false
        }
    }
}

pub(crate) fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else if target > current {
        current + max_delta
    } else {
        current - max_delta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrateBody {
    pub body: KinematicBody,
    pub sprite: Option<SpriteHandle>,
}

impl CrateBody {
    pub fn new(spawn: Rect) -> Self {
        Self {
            body: KinematicBody::new(Vec2::new(spawn.x, spawn.y), Vec2::new(spawn.w, spawn.h)),
            sprite: None,
        }
    }

    /// Direction the player is shoving this crate, if it is in side contact
    /// within the vertical band.
    fn push_direction(&self, player: &Player, config: &PhysicsConfig) -> Option<f32> {
        let dir = player.push_dir;
        if dir == 0.0 {
            return None;
        }
        let p = player.body.aabb();
        let c = self.body.aabb();
        if p.vertical_overlap(&c) < config.push_band * p.h.min(c.h) {
            return None;
        }
        let gap = if dir > 0.0 { c.x - p.right() } else { p.x - c.right() };
        // Slightly negative when the player has not been pushed out yet.
        (gap.abs() <= config.push_reach).then_some(dir)
    }

    /// Side contact with another crate stops this one flush against it.
    /// Overlaps that are shallower vertically are left to the support pass.
    fn separate_from_crates(&mut self, other_crates: &[Rect]) {
        for other in other_crates {
            let Some(depths) = self.body.aabb().overlap_depths(other) else {
                continue;
            };
            match depths.min_axis() {
                (PushAxis::Left, depth) => self.body.pos.x -= depth,
                (PushAxis::Right, depth) => self.body.pos.x += depth,
                (PushAxis::Up | PushAxis::Down, _) => continue,
            }
            self.body.vel.x = 0.0;
        }
    }

    /// Returns true while being pushed.
    pub fn step(
        &mut self,
        player: &Player,
        other_crates: &[Rect],
        platforms: &[Rect],
        bounds: WorldBounds,
        config: &PhysicsConfig,
    ) -> bool {
        let prev = self.body.aabb();
        self.body.vel.y += config.gravity * config.crate_gravity_scale;

        let push = self.push_direction(player, config);
        match push {
            Some(dir) => {
                self.body.vel.x = move_towards(
                    self.body.vel.x,
                    dir * config.crate_max_speed,
                    config.push_accel,
                );
            }
            None => {
                self.body.vel.x *= config.crate_friction;
                if self.body.vel.x.abs() < config.crate_rest_threshold {
                    self.body.vel.x = 0.0;
                }
            }
        }
        self.body.vel.x = self
            .body
            .vel
            .x
            .clamp(-config.crate_max_speed, config.crate_max_speed);

        self.body.integrate();
        self.separate_from_crates(other_crates);
        self.body.clamp_horizontal(bounds);

        self.body.grounded = false;
        for support in platforms.iter().chain(other_crates) {
            let aabb = self.body.aabb();
            if self.body.vel.y >= 0.0
                && aabb.horizontal_overlap(support) > 0.0
                && prev.bottom() <= support.y + config.rest_tolerance
                && aabb.bottom() >= support.y
            {
                self.body.pos.y = support.y - self.body.size.y;
                self.body.vel.y = 0.0;
                self.body.grounded = true;
            }
        }
        self.body.clamp_floor(bounds);
        push.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Player,
    Crate,
}

/// Read-only snapshot of one body, for debugging and summaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub kind: BodyKind,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    pub player: PlayerEvents,
    pub crates_pushed: usize,
}

/// Every body the physics step touches. Platforms are static; the player and
/// crates are kinematic.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    pub platforms: Vec<Rect>,
    pub player: Player,
    pub crates: Vec<CrateBody>,
}

impl PhysicsWorld {
    pub fn new(platforms: Vec<Rect>, player: Player, crates: Vec<CrateBody>) -> Self {
        Self {
            platforms,
            player,
            crates,
        }
    }

    pub fn step(
        &mut self,
        input: &FrameInput,
        config: &PhysicsConfig,
        bounds: WorldBounds,
        mask: &CollisionMask,
    ) -> StepEvents {
        let crate_rects: Vec<Rect> = self.crates.iter().map(|c| c.body.aabb()).collect();
        let ctx = StepContext {
            platforms: &self.platforms,
            crates: &crate_rects,
            bounds,
            config,
            mask,
        };
        let player = self.player.step(input, &ctx);

        let mut crates_pushed = 0;
        for i in 0..self.crates.len() {
            let others: Vec<Rect> = self
                .crates
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, c)| c.body.aabb())
                .collect();
            if self.crates[i].step(&self.player, &others, &self.platforms, bounds, config) {
                crates_pushed += 1;
            }
        }

        StepEvents {
            player,
            crates_pushed,
        }
    }

    pub fn bodies(&self) -> Vec<BodyView> {
        let statics = self.platforms.iter().map(|rect| BodyView {
            kind: BodyKind::Static,
            rect: *rect,
        });
        let player = std::iter::once(BodyView {
            kind: BodyKind::Player,
            rect: self.player.body.aabb(),
        });
        let crates = self.crates.iter().map(|c| BodyView {
            kind: BodyKind::Crate,
            rect: c.body.aabb(),
        });
        statics.chain(player).chain(crates).collect()
    }
}
