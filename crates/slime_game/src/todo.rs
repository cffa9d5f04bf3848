//! TODO feed shown through the sign overlay.
//!
//! The feed is fetched once at startup. Any failure, including an empty list,
//! falls back to a fixed five-item set so sign indices always resolve.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub title: String,
    pub date: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TodoItem {
    fn new(title: &str, date: &str, kind: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            date: date.to_string(),
            kind: kind.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedJson {
    Wrapped {
        #[serde(rename = "TODO")]
        todo: Vec<TodoItem>,
    },
    Bare(Vec<TodoItem>),
}

pub fn fallback_todos() -> Vec<TodoItem> {
    vec![
        TodoItem::new("Finish portfolio site", "2025-01-15", Some("Career")),
        TodoItem::new("Learn a new framework", "2025-02-01", Some("Career")),
        TodoItem::new("Build a platformer", "2025-02-20", Some("Personal")),
        TodoItem::new("Draw pixel art sprites", "2025-03-10", Some("Personal")),
        TodoItem::new("Apply for internships", "2025-04-01", Some("Career")),
    ]
}

/// Accepts `{"TODO": [...]}` or a bare array of records.
pub fn parse_feed(raw: &str) -> Result<Vec<TodoItem>, String> {
    let feed: FeedJson =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse TODO feed JSON: {e}"))?;
    Ok(match feed {
        FeedJson::Wrapped { todo } => todo,
        FeedJson::Bare(items) => items,
    })
}

pub fn load_feed(path: &Path) -> Result<Vec<TodoItem>, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_feed(&raw).map_err(|e| format!("{} ({})", e, path.display()))
}

pub fn load_feed_or_fallback(path: &Path) -> Vec<TodoItem> {
    match load_feed(path) {
        Ok(items) if !items.is_empty() => {
            log::info!("Loaded {} TODO items from {}", items.len(), path.display());
            items
        }
        Ok(_) => {
            log::warn!(
                "TODO feed {} is empty, using fallback list",
                path.display()
            );
            fallback_todos()
        }
        Err(err) => {
            log::warn!("TODO feed unavailable, using fallback list: {err}");
            fallback_todos()
        }
    }
}
