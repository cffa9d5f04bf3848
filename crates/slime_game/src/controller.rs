use glam::Vec2;
use slime_core::input::{InputState, Key};

use crate::collision::{CollisionMask, PushAxis, Rect};
use crate::physics::{KinematicBody, PhysicsConfig, WorldBounds};

/// Level-triggered input for one tick. Edges are derived inside the step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub move_x: f32,
    pub jump: bool,
    pub interact: bool,
    pub dodge: bool,
}

impl FrameInput {
    pub fn from_keys(input: &InputState) -> Self {
        Self {
            move_x: input.direction().x,
            jump: input.is_held(Key::Up) || input.is_held(Key::W) || input.is_held(Key::Space),
            interact: input.is_held(Key::E) || input.is_held(Key::Enter),
            dodge: input.is_held(Key::X),
        }
    }
}

/// No ladder or climbing state: no tile tag places a ladder in a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMode {
    Grounded,
    Airborne,
    Dodging,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerEvents {
    pub jumped: bool,
    pub landed: bool,
    pub dodged: bool,
    /// The collision mask errored and the plain AABB answer was used.
    pub mask_fallback: bool,
}

/// Everything the player resolves against this tick.
pub struct StepContext<'a> {
    pub platforms: &'a [Rect],
    pub crates: &'a [Rect],
    pub bounds: WorldBounds,
    pub config: &'a PhysicsConfig,
    pub mask: &'a CollisionMask,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: KinematicBody,
    /// Horizontal intent for this tick (-1, 0, 1), recorded before collision
    /// zeroes the velocity. Crates read it to decide whether they are pushed.
    pub push_dir: f32,
    facing: f32,
    jump_was_down: bool,
    dodge_was_down: bool,
    dodge_ticks_left: u32,
    dodge_cooldown: u32,
    dodging: bool,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            body: KinematicBody::new(pos, size),
            push_dir: 0.0,
            facing: 1.0,
            jump_was_down: false,
            dodge_was_down: false,
            dodge_ticks_left: 0,
            dodge_cooldown: 0,
            dodging: false,
        }
    }

    pub fn mode(&self) -> PlayerMode {
        if self.dodging {
            PlayerMode::Dodging
        } else if self.body.grounded {
            PlayerMode::Grounded
        } else {
            PlayerMode::Airborne
        }
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn step(&mut self, input: &FrameInput, ctx: &StepContext) -> PlayerEvents {
        let config = ctx.config;
        let mut events = PlayerEvents::default();
        let was_grounded = self.body.grounded;
        let prev = self.body.aabb();

        let jump_pressed = input.jump && !self.jump_was_down;
        self.jump_was_down = input.jump;
        let dodge_pressed = input.dodge && !self.dodge_was_down;
        self.dodge_was_down = input.dodge;

        self.body.vel.y += config.gravity;

        let move_x = input.move_x.clamp(-1.0, 1.0);
        if move_x != 0.0 {
            self.facing = move_x.signum();
        }
        self.body.vel.x = move_x * config.move_speed;

        self.dodge_cooldown = self.dodge_cooldown.saturating_sub(1);
        self.dodging = if self.dodge_ticks_left > 0 {
            self.dodge_ticks_left -= 1;
            true
        } else if dodge_pressed && self.dodge_cooldown == 0 && config.dodge_ticks > 0 {
            self.dodge_ticks_left = config.dodge_ticks - 1;
            self.dodge_cooldown = config.dodge_recharge_ticks;
            events.dodged = true;
            true
        } else {
            false
        };
        if self.dodging {
            self.body.vel.x = self.facing * config.move_speed * config.dodge_speed_multiplier;
        }

        if jump_pressed && was_grounded && !self.dodging {
            self.body.vel.y = config.jump_impulse;
            self.body.grounded = false;
            events.jumped = true;
        }

        self.push_dir = if self.body.vel.x > 0.0 {
            1.0
        } else if self.body.vel.x < 0.0 {
            -1.0
        } else {
            0.0
        };

        self.body.integrate();
        self.body.clamp_horizontal(ctx.bounds);

        self.body.grounded = false;
        self.body.clamp_floor(ctx.bounds);
        self.land_on_platforms(prev, ctx, &mut events);
        self.resolve_crates(ctx);

        events.landed = self.body.grounded && !was_grounded;
        events
    }

    /// One-way platforms: only a falling body whose top started above the
    /// platform top gets snapped onto it.
    fn land_on_platforms(&mut self, prev: Rect, ctx: &StepContext, events: &mut PlayerEvents) {
        for platform in ctx.platforms {
            let aabb = self.body.aabb();
            if !aabb.intersects(platform) || self.body.vel.y <= 0.0 || prev.y >= platform.y {
                continue;
            }
            if ctx.mask.enabled {
                match ctx.mask.check(&aabb, platform) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        log::warn!("Collision mask check failed, using AABB result: {err}");
                        events.mask_fallback = true;
                    }
                }
            }
            self.body.pos.y = platform.y - self.body.size.y;
            self.body.vel.y = 0.0;
            self.body.grounded = true;
        }
    }

    fn resolve_crates(&mut self, ctx: &StepContext) {
        for crate_rect in ctx.crates {
            let Some(depths) = self.body.aabb().overlap_depths(crate_rect) else {
                continue;
            };
            match depths.min_axis() {
                (PushAxis::Up, depth) => {
                    self.body.pos.y -= depth;
                    if self.body.vel.y > 0.0 {
                        self.body.vel.y = 0.0;
                    }
                    self.body.grounded = true;
                }
                (PushAxis::Down, depth) => self.body.pos.y += depth,
                (PushAxis::Left, depth) => {
                    self.body.pos.x -= depth;
                    self.body.vel.x = 0.0;
                }
                (PushAxis::Right, depth) => {
                    self.body.pos.x += depth;
                    self.body.vel.x = 0.0;
                }
            }
        }
        // A crate against a wall can shove the player out of the world.
        self.body.clamp_horizontal(ctx.bounds);
        self.body.clamp_floor(ctx.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds::from_grid(25, 15, 64)
    }

    fn on_floor(x: f32) -> Player {
        let mut player = Player::new(Vec2::new(x, 960.0 - 48.0), Vec2::new(48.0, 48.0));
        player.body.grounded = true;
        player
    }

    fn step(player: &mut Player, input: FrameInput, platforms: &[Rect], mask: &CollisionMask) -> PlayerEvents {
        let config = PhysicsConfig::default();
        let ctx = StepContext {
            platforms,
            crates: &[],
            bounds: bounds(),
            config: &config,
            mask,
        };
        player.step(&input, &ctx)
    }

    fn input(move_x: f32, jump: bool) -> FrameInput {
        FrameInput {
            move_x,
            jump,
            ..FrameInput::default()
        }
    }

    #[test]
    fn deterministic_sequence_reaches_same_final_state() {
        let platforms: Vec<Rect> = (0..25)
            .filter(|i| *i != 6)
            .map(|i| Rect::new(i as f32 * 64.0, 768.0, 64.0, 64.0))
            .collect();
        let mut inputs = vec![input(1.0, false); 60];
        inputs.push(input(1.0, true));
        inputs.extend(vec![input(1.0, false); 120]);
        inputs.extend(vec![input(-1.0, false); 60]);

        let mask = CollisionMask::default();
        let mut run_a = on_floor(64.0);
        let mut run_b = on_floor(64.0);
        for frame in &inputs {
            step(&mut run_a, *frame, &platforms, &mask);
        }
        for frame in &inputs {
            step(&mut run_b, *frame, &platforms, &mask);
        }
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn jump_only_activates_when_grounded() {
        let mask = CollisionMask::default();
        let mut player = Player::new(Vec2::new(100.0, 100.0), Vec2::new(48.0, 48.0));
        let events = step(&mut player, input(0.0, true), &[], &mask);
        assert!(!events.jumped);
        assert!(player.body.vel.y > 0.0);
    }

    #[test]
    fn jump_sets_impulse_and_leaves_ground() {
        let mask = CollisionMask::default();
        let mut player = on_floor(100.0);
        let events = step(&mut player, input(0.0, true), &[], &mask);
        assert!(events.jumped);
        assert_eq!(player.body.vel.y, PhysicsConfig::default().jump_impulse);
        assert!(!player.body.grounded);
        assert_eq!(player.mode(), PlayerMode::Airborne);
    }

    #[test]
    fn jump_from_a_platform_after_landing_on_it() {
        let mask = CollisionMask::default();
        let platform = [Rect::new(64.0, 880.0, 64.0, 64.0)];
        let mut player = Player::new(Vec2::new(70.0, 880.0 - 58.0), Vec2::new(48.0, 48.0));
        let mut landed = false;
        for _ in 0..20 {
            if step(&mut player, input(0.0, false), &platform, &mask).landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(player.body.pos.y, 880.0 - 48.0);
        assert_eq!(player.mode(), PlayerMode::Grounded);

        let events = step(&mut player, input(0.0, true), &platform, &mask);
        assert!(events.jumped);
        assert_eq!(player.body.vel.y, PhysicsConfig::default().jump_impulse);
        assert!(player.body.pos.y < 880.0 - 48.0);
        assert_eq!(player.mode(), PlayerMode::Airborne);
    }

    #[test]
    fn held_jump_does_not_rejump_after_landing() {
        let mask = CollisionMask::default();
        let mut player = on_floor(100.0);
        let mut jumps = 0;
        let mut landings = 0;
        for _ in 0..200 {
            let events = step(&mut player, input(0.0, true), &[], &mask);
            jumps += events.jumped as u32;
            landings += events.landed as u32;
        }
        assert_eq!(jumps, 1);
        assert_eq!(landings, 1);
        assert!(player.body.grounded);

        step(&mut player, input(0.0, false), &[], &mask);
        assert!(step(&mut player, input(0.0, true), &[], &mask).jumped);
    }

    #[test]
    fn horizontal_clamp_stops_at_walls() {
        let mask = CollisionMask::default();
        let mut player = on_floor(2.0);
        for _ in 0..5 {
            step(&mut player, input(-1.0, false), &[], &mask);
            assert!(player.body.pos.x >= 0.0);
        }
        assert_eq!(player.body.pos.x, 0.0);

        let mut player = on_floor(1600.0 - 50.0);
        for _ in 0..5 {
            step(&mut player, input(1.0, false), &[], &mask);
        }
        assert_eq!(player.body.pos.x, 1600.0 - 48.0);
    }

    #[test]
    fn platforms_are_one_way() {
        let mask = CollisionMask::default();
        // The player starts overlapping the platform from below.
        let platform = [Rect::new(64.0, 880.0, 64.0, 64.0)];
        let mut player = on_floor(70.0);
        let mut passed_above = false;
        let mut landed_on_platform = false;
        for i in 0..120 {
            let events = step(&mut player, input(0.0, i == 0), &platform, &mask);
            if player.body.pos.y + 48.0 < 880.0 {
                passed_above = true;
            }
            if events.landed && player.body.pos.y == 880.0 - 48.0 {
                landed_on_platform = true;
            }
        }
        assert!(passed_above);
        assert!(landed_on_platform);
        assert!(player.body.grounded);
        assert_eq!(player.body.pos.y, 832.0);
    }

    #[test]
    fn mask_error_falls_back_to_aabb() {
        let mask = CollisionMask {
            enabled: true,
            cores: Vec::new(),
        };
        let platform = [Rect::new(0.0, 500.0, 64.0, 64.0)];
        let mut player = Player::new(Vec2::new(0.0, 450.0), Vec2::new(48.0, 48.0));
        let mut fell_back = false;
        for _ in 0..10 {
            fell_back |= step(&mut player, input(0.0, false), &platform, &mask).mask_fallback;
        }
        assert!(fell_back);
        assert_eq!(player.body.pos.y, 452.0);
        assert!(player.body.grounded);
    }

    #[test]
    fn crate_side_contact_zeroes_horizontal_velocity() {
        let config = PhysicsConfig::default();
        let mask = CollisionMask::default();
        let crates = [Rect::new(150.0, 896.0, 64.0, 64.0)];
        let mut player = on_floor(100.0);
        let ctx = StepContext {
            platforms: &[],
            crates: &crates,
            bounds: bounds(),
            config: &config,
            mask: &mask,
        };
        player.step(&input(1.0, false), &ctx);
        assert_eq!(player.body.pos.x, 102.0);
        assert_eq!(player.body.vel.x, 0.0);
        assert_eq!(player.push_dir, 1.0);
    }

    #[test]
    fn dodge_is_edge_triggered_and_recharges() {
        let config = PhysicsConfig::default();
        let mask = CollisionMask::default();
        let mut player = on_floor(100.0);
        let dodge = FrameInput {
            dodge: true,
            ..FrameInput::default()
        };
        let events = step(&mut player, dodge, &[], &mask);
        assert!(events.dodged);
        assert_eq!(player.mode(), PlayerMode::Dodging);
        assert_eq!(
            player.body.vel.x,
            config.move_speed * config.dodge_speed_multiplier
        );

        let mut dodging_ticks = 1;
        for _ in 0..60 {
            step(&mut player, dodge, &[], &mask);
            if player.mode() == PlayerMode::Dodging {
                dodging_ticks += 1;
            }
        }
        assert_eq!(dodging_ticks, config.dodge_ticks);

        // Released and pressed again before the recharge finishes.
        step(&mut player, FrameInput::default(), &[], &mask);
        assert!(!step(&mut player, dodge, &[], &mask).dodged);
    }

    #[test]
    fn from_keys_maps_bindings() {
        let mut keys = InputState::new();
        keys.key_down_named("a");
        keys.key_down_named(" ");
        keys.key_down_named("Enter");
        let frame = FrameInput::from_keys(&keys);
        assert_eq!(frame.move_x, -1.0);
        assert!(frame.jump);
        assert!(frame.interact);
        assert!(!frame.dodge);
    }
}
