//! Keyboard state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every tick the key
//!   is physically down. Movement reads this.
//!
//! - **Edge-triggered (just_pressed):** true only until
//!   `end_frame()` runs. The host calls `end_frame()` after at least one fixed
//!   tick has consumed the snapshot, so a press is never lost on a frame with
//!   zero ticks.
//!
//! Browser-style key events carry two names for the same key: the physical
//! `code` ("ArrowLeft", "KeyA") and the logical `key` ("a", "A", " "). Both map
//! onto the same [`Key`], so listeners can forward either without caring which.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    A,
    D,
    W,
    S,
    E,
    X,
    Enter,
    Escape,
}

impl Key {
    /// Map a DOM `code` or `key` string to an engine key.
    pub fn from_dom(name: &str) -> Option<Key> {
        let key = match name {
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            "Space" | " " | "Spacebar" => Key::Space,
            "KeyA" | "a" | "A" => Key::A,
            "KeyD" | "d" | "D" => Key::D,
            "KeyW" | "w" | "W" => Key::W,
            "KeyS" | "s" | "S" => Key::S,
            "KeyE" | "e" | "E" => Key::E,
            "KeyX" | "x" | "X" => Key::X,
            "Enter" | "NumpadEnter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            _ => return None,
        };
        Some(key)
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Forward a DOM-named key-down event. Unknown names are ignored.
    pub fn key_down_named(&mut self, name: &str) {
        match Key::from_dom(name) {
            Some(key) => self.key_down(key),
            None => log::trace!("Ignoring unmapped key-down '{name}'"),
        }
    }

    /// Forward a DOM-named key-up event. Unknown names are ignored.
    pub fn key_up_named(&mut self, name: &str) {
        match Key::from_dom(name) {
            Some(key) => self.key_up(key),
            None => log::trace!("Ignoring unmapped key-up '{name}'"),
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Directional vector from arrows / WASD, each axis in {-1, 0, 1}.
    /// Y grows downward to match screen space.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: [Key; 2], pos: [Key; 2]| -> f32 {
            let n = neg.iter().any(|k| self.is_held(*k)) as i32;
            let p = pos.iter().any(|k| self.is_held(*k)) as i32;
            (p - n) as f32
        };
        Vec2::new(
            axis([Key::Left, Key::A], [Key::Right, Key::D]),
            axis([Key::Up, Key::W], [Key::Down, Key::S]),
        )
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        assert!(input.is_held(Key::A));
        assert!(input.is_just_pressed(Key::A));
    }

    #[test]
    fn test_key_up_clears_held() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::E);
        assert!(!input.is_just_pressed(Key::E));
        assert!(!input.is_held(Key::E));
    }

    #[test]
    fn test_end_frame_keeps_held_clears_edges() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn test_code_and_character_map_to_same_key() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom("KeyA"), Some(Key::A));
        assert_eq!(Key::from_dom("a"), Some(Key::A));
        assert_eq!(Key::from_dom("A"), Some(Key::A));
        assert_eq!(Key::from_dom(" "), Some(Key::Space));
        assert_eq!(Key::from_dom("F13"), None);
    }

    #[test]
    fn test_named_events_share_one_held_entry() {
        let mut input = InputState::new();
        // A browser fires both the code and the character for one press.
        input.key_down_named("KeyD");
        input.key_down_named("d");
        assert!(input.is_held(Key::D));
        input.key_up_named("KeyD");
        assert!(!input.is_held(Key::D));
        input.key_up_named("d");
        assert!(!input.is_held(Key::D));
    }

    #[test]
    fn test_direction_cancels_opposites() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        assert_eq!(input.direction(), Vec2::new(-1.0, 0.0));
        input.key_down(Key::D);
        assert_eq!(input.direction(), Vec2::new(0.0, 0.0));
        input.key_down(Key::W);
        assert_eq!(input.direction(), Vec2::new(0.0, -1.0));
    }
}
