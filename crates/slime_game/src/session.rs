//! One running game: level, bodies, animation and interaction state, stepped
//! together once per tick.
//!
//! Derived views (platform rects, signs, world bounds) are rebuilt lazily at
//! the start of a tick whenever the level's revision has moved, so editor
//! writes through [`GameSession::level_mut`] take effect on the next tick.

use glam::Vec2;
use serde::Serialize;

use crate::animation::{CharacterAnimator, ClipSet, MotionClip};
use crate::collision::Rect;
use crate::config::GameConfig;
use crate::controller::{FrameInput, Player, PlayerMode};
use crate::interaction::{InteractionState, MessageOverlay, Sign};
use crate::level::Level;
use crate::physics::{BodyKind, CrateBody, PhysicsWorld, StepEvents, WorldBounds};
use crate::render::{Renderer, SpriteHandle, CRATE_TEXTURE, PLATFORM_TEXTURE, SIGN_TEXTURE};
use crate::todo::TodoItem;

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub events: StepEvents,
    pub frame: String,
    pub nearby_sign: Option<usize>,
    pub opened: bool,
    pub closed: bool,
    /// Derived views were rebuilt from the level before stepping.
    pub rebuilt: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub ticks: u64,
    pub level_revision: u64,
    pub player: [f32; 2],
    /// -1 facing left, 1 facing right.
    pub facing: f32,
    pub grounded: bool,
    pub clip: &'static str,
    pub platforms: usize,
    pub crates: Vec<[f32; 2]>,
    pub message: Option<TodoItem>,
}

#[derive(Debug, Default)]
struct SpriteBook {
    player: Option<SpriteHandle>,
    statics: Vec<SpriteHandle>,
    statics_revision: Option<u64>,
    orphaned: Vec<SpriteHandle>,
}

pub struct GameSession {
    config: GameConfig,
    level: Level,
    todos: Vec<TodoItem>,
    clips: ClipSet,
    world: PhysicsWorld,
    signs: Vec<Sign>,
    bounds: WorldBounds,
    built_revision: u64,
    crate_spawns: Vec<Rect>,
    animator: CharacterAnimator,
    interaction: InteractionState,
    tick_count: u64,
    sprites: SpriteBook,
}

impl GameSession {
    pub fn new(config: GameConfig, level: Level, todos: Vec<TodoItem>, clips: ClipSet) -> Self {
        let tile = config.world.tile_size;
        let player = Player::new(
            Vec2::new(config.player.start_x, config.player.start_y),
            Vec2::new(config.player.width, config.player.height),
        );
        let crate_spawns = level.crate_spawns(tile);
        let world = PhysicsWorld::new(
            level.platforms(tile),
            player,
            crate_spawns.iter().copied().map(CrateBody::new).collect(),
        );
        let signs = level.signs(tile, todos.len());
        let bounds = WorldBounds::from_grid(level.width(), level.height(), tile);
        let built_revision = level.revision();
        log::info!(
            "Session ready: {}x{} level, {} platforms, {} signs, {} crates, {} TODOs",
            level.width(),
            level.height(),
            world.platforms.len(),
            signs.len(),
            world.crates.len(),
            todos.len()
        );
        Self {
            config,
            level,
            todos,
            clips,
            world,
            signs,
            bounds,
            built_revision,
            crate_spawns,
            animator: CharacterAnimator::new(),
            interaction: InteractionState::new(),
            tick_count: 0,
            sprites: SpriteBook::default(),
        }
    }

    /// Rebuild derived views if the grid changed. Crates are respawned when
    /// their spawn cells changed or `force_crates` is set.
    fn refresh_views(&mut self, force_crates: bool) -> bool {
        if self.level.revision() == self.built_revision && !force_crates {
            return false;
        }
        let tile = self.config.world.tile_size;
        self.world.platforms = self.level.platforms(tile);
        self.signs = self.level.signs(tile, self.todos.len());
        self.bounds = WorldBounds::from_grid(self.level.width(), self.level.height(), tile);

        let spawns = self.level.crate_spawns(tile);
        if force_crates || spawns != self.crate_spawns {
            let old = std::mem::take(&mut self.world.crates);
            self.sprites
                .orphaned
                .extend(old.into_iter().filter_map(|c| c.sprite));
            self.world.crates = spawns.iter().copied().map(CrateBody::new).collect();
            self.crate_spawns = spawns;
        }
        self.built_revision = self.level.revision();
        log::debug!(
            "Rebuilt level views at revision {}: {} platforms, {} signs",
            self.built_revision,
            self.world.platforms.len(),
            self.signs.len()
        );
        true
    }

    pub fn tick(&mut self, input: &FrameInput) -> TickReport {
        let rebuilt = self.refresh_views(false);
        let events = self.world.step(
            input,
            &self.config.physics,
            self.bounds,
            &self.config.collision_mask,
        );
        let frame = self
            .animator
            .update(
                input.move_x,
                events.player.jumped,
                self.world.player.body.grounded,
                &self.clips,
            )
            .to_string();
        let interaction = self.interaction.update(
            input.interact,
            &self.world.player.body.aabb(),
            &self.signs,
            &self.todos,
            self.config.interaction.sign_margin,
        );
        self.tick_count += 1;

        TickReport {
            tick: self.tick_count,
            events,
            frame,
            nearby_sign: interaction.nearby,
            opened: interaction.opened,
            closed: interaction.closed,
            rebuilt,
        }
    }

    /// Replace the level from JSON. On failure nothing changes.
    pub fn load_level(&mut self, raw: &str) -> Result<(), String> {
        self.level.load_from_str(raw)?;
        self.refresh_views(true);
        Ok(())
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    #[allow(dead_code)]
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn player(&self) -> &Player {
        &self.world.player
    }

    #[allow(dead_code)]
    pub fn crates(&self) -> &[CrateBody] {
        &self.world.crates
    }

    #[allow(dead_code)]
    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    #[allow(dead_code)]
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn overlay(&self) -> &MessageOverlay {
        &self.interaction.overlay
    }

    #[allow(dead_code)]
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Push current placements to the renderer, spawning whatever is missing.
    pub fn sync<R: Renderer>(&mut self, renderer: &mut R) {
        self.refresh_views(false);
        for handle in self.sprites.orphaned.drain(..) {
            renderer.despawn(handle);
        }

        if self.sprites.statics_revision != Some(self.built_revision) {
            for handle in self.sprites.statics.drain(..) {
                renderer.despawn(handle);
            }
            for rect in &self.world.platforms {
                self.sprites
                    .statics
                    .push(renderer.spawn(PLATFORM_TEXTURE, *rect));
            }
            for sign in &self.signs {
                self.sprites
                    .statics
                    .push(renderer.spawn(SIGN_TEXTURE, sign.rect));
            }
            self.sprites.statics_revision = Some(self.built_revision);
            log::debug!("Spawned {} static sprites", self.sprites.statics.len());
        }

        let texture = self.animator.current(&self.clips);
        let rect = self.world.player.body.aabb();
        match self.sprites.player {
            Some(handle) => renderer.place(handle, texture, rect),
            None => self.sprites.player = Some(renderer.spawn(texture, rect)),
        }

        for crate_body in &mut self.world.crates {
            let rect = crate_body.body.aabb();
            match crate_body.sprite {
                Some(handle) => renderer.place(handle, CRATE_TEXTURE, rect),
                None => crate_body.sprite = Some(renderer.spawn(CRATE_TEXTURE, rect)),
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let player = &self.world.player;
        let bodies = self.world.bodies();
        SessionSummary {
            ticks: self.tick_count,
            level_revision: self.level.revision(),
            player: player.body.pos.to_array(),
            facing: player.facing(),
            grounded: player.body.grounded,
            clip: match (self.animator.clip(), player.mode()) {
                (_, PlayerMode::Dodging) => "dodge",
                (MotionClip::Idle, _) => "idle",
                (MotionClip::Moving, _) => "move",
            },
            platforms: bodies.iter().filter(|b| b.kind == BodyKind::Static).count(),
            crates: bodies
                .iter()
                .filter(|b| b.kind == BodyKind::Crate)
                .map(|b| [b.rect.x, b.rect.y])
                .collect(),
            message: self.interaction.overlay.message().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::TileTag;
    use crate::render::LogRenderer;
    use crate::todo::fallback_todos;

    fn sample_session() -> GameSession {
        GameSession::new(
            GameConfig::default(),
            Level::sample(),
            fallback_todos(),
            ClipSet::builtin(),
        )
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn settle(session: &mut GameSession) {
        for _ in 0..120 {
            session.tick(&idle());
        }
    }

    #[test]
    fn player_falls_onto_platform_row() {
        let mut session = sample_session();
        settle(&mut session);
        let player = session.player();
        assert!(player.body.grounded);
        assert_eq!(player.body.pos.y, 12.0 * 64.0 - 48.0);
        assert_eq!(session.crates()[0].body.pos, Vec2::new(256.0, 704.0));
    }

    #[test]
    fn interact_on_first_sign_shows_first_todo() {
        let mut session = sample_session();
        settle(&mut session);
        let press = FrameInput {
            interact: true,
            ..FrameInput::default()
        };
        let report = session.tick(&press);
        assert_eq!(report.nearby_sign, Some(0));
        assert!(report.opened);
        assert_eq!(session.overlay().message(), Some(&session.todos()[0]));

        session.tick(&idle());
        assert!(session.tick(&press).closed);
        assert!(!session.overlay().is_showing());
    }

    #[test]
    fn walking_right_pushes_the_crate() {
        let mut session = sample_session();
        settle(&mut session);
        let right = FrameInput {
            move_x: 1.0,
            ..FrameInput::default()
        };
        let mut frame = String::new();
        for _ in 0..60 {
            frame = session.tick(&right).frame;
        }
        assert!(frame.starts_with("slime_jump_"));
        assert!(session.crates()[0].body.pos.x > 256.0);
    }

    #[test]
    fn editor_write_rebuilds_on_next_tick() {
        let mut session = sample_session();
        assert_eq!(session.world().platforms.len(), 24);
        session.level_mut().set_tile(0, 12, TileTag::Empty);
        let report = session.tick(&idle());
        assert!(report.rebuilt);
        assert_eq!(session.world().platforms.len(), 23);
        assert!(!session.tick(&idle()).rebuilt);
    }

    #[test]
    fn failed_load_keeps_level() {
        let mut session = sample_session();
        let revision = session.level().revision();
        assert!(session.load_level(r#"{"width": 2, "height": 1, "data": [[1]]}"#).is_err());
        assert_eq!(session.level().revision(), revision);
        assert_eq!(session.level().width(), Level::SAMPLE_WIDTH);
    }

    #[test]
    fn load_replaces_level_and_crates() {
        let mut session = sample_session();
        settle(&mut session);
        session
            .load_level(r#"{"width": 3, "height": 2, "data": [[3, 0, 3], [1, 1, 1]]}"#)
            .expect("valid level");
        assert_eq!(session.world().platforms.len(), 3);
        assert_eq!(session.crates().len(), 2);
        assert_eq!(session.crates()[1].body.pos, Vec2::new(128.0, 0.0));
        assert!(session.signs().is_empty());
    }

    #[test]
    fn sync_spawns_once_and_respawns_statics_after_edit() {
        let mut session = sample_session();
        let mut renderer = LogRenderer::new();
        session.sync(&mut renderer);
        // 24 platforms, 5 signs, the player and one crate.
        assert_eq!(renderer.live_count(), 31);
        assert_eq!(renderer.count_texture(SIGN_TEXTURE), 5);

        session.tick(&idle());
        session.sync(&mut renderer);
        assert_eq!(renderer.live_count(), 31);

        session.level_mut().set_tile(0, 12, TileTag::Empty);
        session.tick(&idle());
        session.sync(&mut renderer);
        assert_eq!(renderer.live_count(), 30);
        assert_eq!(renderer.count_texture(CRATE_TEXTURE), 1);
    }

    #[test]
    fn summary_serializes() {
        let mut session = sample_session();
        settle(&mut session);
        let summary = session.summary();
        assert_eq!(summary.ticks, 120);
        assert_eq!(summary.clip, "idle");
        assert_eq!(summary.facing, 1.0);
        assert_eq!(summary.platforms, 24);
        assert_eq!(summary.crates, vec![[256.0, 704.0]]);
        let json = serde_json::to_string(&summary).expect("summary should serialize");
        assert!(json.contains("\"grounded\":true"));
    }
}
