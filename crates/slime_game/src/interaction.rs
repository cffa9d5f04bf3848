//! Sign proximity and the TODO message overlay.
//!
//! Two tests run against each sign: an enlarged box decides "nearby" (only
//! reported), the plain box decides whether the action key can open the
//! overlay. The action key is edge-triggered through a debounce latch, so a
//! held key toggles the overlay exactly once per physical press.

use crate::collision::Rect;
use crate::todo::TodoItem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sign {
    pub rect: Rect,
    pub todo_index: usize,
}

/// TODO index of the first sign whose margin-expanded box overlaps `player`.
pub fn nearby_sign(player: &Rect, signs: &[Sign], margin: f32) -> Option<usize> {
    signs
        .iter()
        .find(|sign| sign.rect.expanded(margin).intersects(player))
        .map(|sign| sign.todo_index)
}

pub fn touching_sign<'a>(player: &Rect, signs: &'a [Sign]) -> Option<&'a Sign> {
    signs.iter().find(|sign| sign.rect.intersects(player))
}

/// Single modal; opening while open is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageOverlay {
    message: Option<TodoItem>,
}

impl MessageOverlay {
    pub fn is_showing(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&TodoItem> {
        self.message.as_ref()
    }

    pub fn show_todo_message(&mut self, item: &TodoItem) -> bool {
        if self.is_showing() {
            return false;
        }
        log::info!("Showing TODO: {} ({})", item.title, item.date);
        self.message = Some(item.clone());
        true
    }

    pub fn close(&mut self) -> bool {
        self.message.take().is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionReport {
    pub nearby: Option<usize>,
    pub opened: bool,
    pub closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    interact_was_down: bool,
    pub overlay: MessageOverlay,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        interact_held: bool,
        player: &Rect,
        signs: &[Sign],
        todos: &[TodoItem],
        margin: f32,
    ) -> InteractionReport {
        let pressed = interact_held && !self.interact_was_down;
        self.interact_was_down = interact_held;

        let mut report = InteractionReport {
            nearby: nearby_sign(player, signs, margin),
            ..InteractionReport::default()
        };
        if !pressed {
            return report;
        }

        if self.overlay.is_showing() {
            report.closed = self.overlay.close();
        } else if let Some(sign) = touching_sign(player, signs) {
            if todos.is_empty() {
                log::warn!("Sign touched but TODO list is empty");
            } else {
                let item = &todos[sign.todo_index % todos.len()];
                report.opened = self.overlay.show_todo_message(item);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::fallback_todos;

    fn sign_at(x: f32, todo_index: usize) -> Sign {
        Sign {
            rect: Rect::new(x, 0.0, 64.0, 64.0),
            todo_index,
        }
    }

    #[test]
    fn nearby_uses_expanded_box() {
        let signs = [sign_at(100.0, 3)];
        let player = Rect::new(170.0, 0.0, 48.0, 48.0);
        assert_eq!(nearby_sign(&player, &signs, 16.0), Some(3));
        assert!(touching_sign(&player, &signs).is_none());
        assert_eq!(nearby_sign(&player, &signs, 4.0), None);
    }

    #[test]
    fn reentrant_open_is_a_no_op() {
        let todos = fallback_todos();
        let mut overlay = MessageOverlay::default();
        assert!(overlay.show_todo_message(&todos[0]));
        assert!(!overlay.show_todo_message(&todos[1]));
        assert_eq!(overlay.message(), Some(&todos[0]));
    }

    #[test]
    fn held_key_toggles_once_per_press() {
        let todos = fallback_todos();
        let signs = [sign_at(0.0, 2)];
        let player = Rect::new(10.0, 10.0, 48.0, 48.0);
        let mut state = InteractionState::new();

        let first = state.update(true, &player, &signs, &todos, 16.0);
        assert!(first.opened);
        for _ in 0..30 {
            let held = state.update(true, &player, &signs, &todos, 16.0);
            assert!(!held.opened && !held.closed);
        }
        assert!(state.overlay.is_showing());
        assert_eq!(state.overlay.message(), Some(&todos[2]));

        state.update(false, &player, &signs, &todos, 16.0);
        let second = state.update(true, &player, &signs, &todos, 16.0);
        assert!(second.closed);
        assert!(!state.overlay.is_showing());
    }

    #[test]
    fn press_away_from_signs_does_nothing() {
        let todos = fallback_todos();
        let signs = [sign_at(500.0, 0)];
        let player = Rect::new(0.0, 0.0, 48.0, 48.0);
        let mut state = InteractionState::new();
        let report = state.update(true, &player, &signs, &todos, 16.0);
        assert_eq!(report, InteractionReport::default());
    }

    #[test]
    fn sign_index_wraps_into_short_list() {
        let todos = fallback_todos();
        let signs = [sign_at(0.0, 7)];
        let player = Rect::new(0.0, 0.0, 48.0, 48.0);
        let mut state = InteractionState::new();
        assert!(state.update(true, &player, &signs, &todos, 16.0).opened);
        assert_eq!(state.overlay.message(), Some(&todos[2]));
    }
}
