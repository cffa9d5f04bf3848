//! Character animation: picks between the idle and moving clips each tick.
//!
//! Clips come from an animation definition file (clip names `idle` and
//! `move`) or the built-in slime set. Playback itself lives in
//! `slime_core::animation`.

use std::path::Path;

use slime_core::animation::{load_animation_file, AnimationClip, AnimationFile, AnimationState};

pub const IDLE_CLIP: &str = "idle";
pub const MOVE_CLIP: &str = "move";

#[derive(Debug, Clone, PartialEq)]
pub struct ClipSet {
    pub idle: AnimationClip,
    pub moving: AnimationClip,
}

impl ClipSet {
    pub fn builtin() -> Self {
        Self {
            idle: AnimationClip::new((0..7).map(|i| format!("slime_idle_{i}")).collect(), 0.1),
            moving: AnimationClip::new((0..23).map(|i| format!("slime_jump_{i:02}")).collect(), 0.2),
        }
    }

    pub fn from_file(file: &AnimationFile) -> Result<Self, String> {
        let clip = |name: &str| {
            file.animations.get(name).cloned().ok_or_else(|| {
                format!(
                    "Animation '{}' is missing required clip '{}'",
                    file.animation_id, name
                )
            })
        };
        Ok(Self {
            idle: clip(IDLE_CLIP)?,
            moving: clip(MOVE_CLIP)?,
        })
    }

    pub fn get(&self, clip: MotionClip) -> &AnimationClip {
        match clip {
            MotionClip::Idle => &self.idle,
            MotionClip::Moving => &self.moving,
        }
    }
}

pub fn load_clip_set(path: &Path) -> Result<ClipSet, String> {
    let file = load_animation_file(path)?;
    ClipSet::from_file(&file).map_err(|e| format!("{} ({})", e, path.display()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClip {
    Idle,
    Moving,
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterAnimator {
    clip: MotionClip,
    state: AnimationState,
}

impl Default for CharacterAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterAnimator {
    pub fn new() -> Self {
        Self {
            clip: MotionClip::Idle,
            state: AnimationState::new(),
        }
    }

    pub fn clip(&self) -> MotionClip {
        self.clip
    }

    #[allow(dead_code)]
    pub fn frame_index(&self) -> usize {
        self.state.frame_index
    }

    /// Pick the clip for this tick, then advance it. Returns the texture to
    /// display.
    pub fn update<'a>(
        &mut self,
        move_x: f32,
        jumped: bool,
        grounded: bool,
        clips: &'a ClipSet,
    ) -> &'a str {
        let next = match self.clip {
            MotionClip::Idle if move_x != 0.0 || jumped => MotionClip::Moving,
            MotionClip::Moving if move_x == 0.0 && grounded => MotionClip::Idle,
            current => current,
        };
        if next != self.clip {
            log::debug!("Animator {:?} -> {:?}", self.clip, next);
            self.clip = next;
            self.state.reset();
        }
        self.state.tick(clips.get(self.clip))
    }

    pub fn current<'a>(&self, clips: &'a ClipSet) -> &'a str {
        self.state.current(clips.get(self.clip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slime_core::animation::parse_animation_file;

    #[test]
    fn builtin_clip_sizes() {
        let clips = ClipSet::builtin();
        assert_eq!(clips.idle.len(), 7);
        assert_eq!(clips.moving.len(), 23);
        assert_eq!(clips.moving.frames[22], "slime_jump_22");
    }

    #[test]
    fn idle_advances_once_per_ten_ticks() {
        let clips = ClipSet::builtin();
        let mut animator = CharacterAnimator::new();
        for _ in 0..9 {
            assert_eq!(animator.update(0.0, false, true, &clips), "slime_idle_0");
        }
        assert_eq!(animator.update(0.0, false, true, &clips), "slime_idle_1");
    }

    #[test]
    fn input_switches_to_moving_and_resets() {
        let clips = ClipSet::builtin();
        let mut animator = CharacterAnimator::new();
        for _ in 0..25 {
            animator.update(0.0, false, true, &clips);
        }
        assert_eq!(animator.frame_index(), 2);

        animator.update(1.0, false, true, &clips);
        assert_eq!(animator.clip(), MotionClip::Moving);
        assert_eq!(animator.current(&clips), "slime_jump_00");
    }

    #[test]
    fn stays_moving_while_airborne() {
        let clips = ClipSet::builtin();
        let mut animator = CharacterAnimator::new();
        animator.update(0.0, true, false, &clips);
        assert_eq!(animator.clip(), MotionClip::Moving);
        for _ in 0..10 {
            animator.update(0.0, false, false, &clips);
        }
        assert_eq!(animator.clip(), MotionClip::Moving);
        animator.update(0.0, false, true, &clips);
        assert_eq!(animator.clip(), MotionClip::Idle);
        assert_eq!(animator.frame_index(), 0);
    }

    #[test]
    fn clip_set_requires_idle_and_move() {
        let file = parse_animation_file(
            r#"{
                "version": "0.1",
                "animation_id": "slime",
                "animations": {
                    "idle": { "frames": ["a", "b"], "advance_rate": 0.5 }
                }
            }"#,
            "inline",
        )
        .expect("animation file should parse");
        let err = ClipSet::from_file(&file).expect_err("move clip is missing");
        assert!(err.contains("'move'"));
    }

    #[test]
    fn clip_set_from_sequence_file() {
        let file = parse_animation_file(
            r#"{
                "version": "0.1",
                "animation_id": "slime",
                "animations": {
                    "idle": { "sequence": { "prefix": "idle_", "count": 7 }, "advance_rate": 0.1 },
                    "move": { "sequence": { "prefix": "slime_jump_", "count": 23, "pad": 2 }, "advance_rate": 0.2 }
                }
            }"#,
            "inline",
        )
        .expect("animation file should parse");
        let clips = ClipSet::from_file(&file).expect("both clips present");
        assert_eq!(clips.moving, ClipSet::builtin().moving);
    }
}
