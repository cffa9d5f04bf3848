//! Scripted key events for headless runs.
//!
//! One event per line: `<tick> <down|up> <key>`, where `key` is a DOM key or
//! code name (`ArrowRight`, `KeyE`, `Space`, `a`). Blank lines and lines
//! starting with `#` are skipped. Events fire before the tick they name.
//! Pressing `Escape` ends the run.

use std::fs;
use std::path::Path;

use slime_core::input::{InputState, Key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub tick: u64,
    pub down: bool,
    pub key: String,
}

pub fn parse_key_script(raw: &str) -> Result<Vec<KeyEvent>, String> {
    let mut events = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [tick, action, key] = parts.as_slice() else {
            return Err(format!(
                "Key script line {}: expected '<tick> <down|up> <key>'",
                number + 1
            ));
        };
        let tick: u64 = tick
            .parse()
            .map_err(|e| format!("Key script line {}: bad tick '{tick}': {e}", number + 1))?;
        let down = match *action {
            "down" => true,
            "up" => false,
            other => {
                return Err(format!(
                    "Key script line {}: unknown action '{other}'",
                    number + 1
                ))
            }
        };
        events.push(KeyEvent {
            tick,
            down,
            key: key.to_string(),
        });
    }
    // Stable: same-tick events keep file order.
    events.sort_by_key(|event| event.tick);
    Ok(events)
}

pub fn load_key_script(path: &Path) -> Result<Vec<KeyEvent>, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_key_script(&raw).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Feeds due events into `input` in tick order.
pub struct KeyScript {
    events: Vec<KeyEvent>,
    next: usize,
}

impl KeyScript {
    pub fn new(events: Vec<KeyEvent>) -> Self {
        Self { events, next: 0 }
    }

    /// Apply every event scheduled at or before `tick`.
    pub fn apply_due(&mut self, tick: u64, input: &mut InputState) {
        while let Some(event) = self.events.get(self.next) {
            if event.tick > tick {
                break;
            }
            if event.down {
                input.key_down_named(&event.key);
            } else {
                input.key_up_named(&event.key);
            }
            self.next += 1;
        }
    }
}

/// True on the tick `Escape` goes down.
pub fn stop_requested(input: &InputState) -> bool {
    input.is_just_pressed(Key::Escape)
}
