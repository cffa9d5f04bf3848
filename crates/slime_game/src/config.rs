use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::collision::CollisionMask;
use crate::physics::PhysicsConfig;

/// Largest accepted tile edge in pixels.
pub const MAX_TILE_SIZE: i32 = 4096;

/// Runtime tuning. Every section is optional in the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub interaction: InteractionConfig,
    pub collision_mask: CollisionMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub tile_size: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { tile_size: 64 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_x: 64.0,
            start_y: 0.0,
            width: 48.0,
            height: 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pixels added on every side of a sign for the "nearby" test.
    pub sign_margin: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { sign_margin: 16.0 }
    }
}

pub fn load_config(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if !(1..=MAX_TILE_SIZE).contains(&config.world.tile_size) {
        return Err(format!(
            "Config validation failed: world.tile_size must be in 1..={MAX_TILE_SIZE}"
        ));
    }
    if !(config.player.width > 0.0 && config.player.height > 0.0) {
        return Err("Config validation failed: player size must be > 0".to_string());
    }
    if config.interaction.sign_margin < 0.0 {
        return Err("Config validation failed: interaction.sign_margin must be >= 0".to_string());
    }
    config.physics.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "slime_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{ "physics": { "gravity": 0.3 }, "collision_mask": { "enabled": true } }"#,
        )
        .expect("write config");
        let config = load_config(&path).expect("config should load");
        assert_eq!(config.physics.gravity, 0.3);
        assert_eq!(config.physics.move_speed, PhysicsConfig::default().move_speed);
        assert!(config.collision_mask.enabled);
        assert_eq!(config.collision_mask.cores, CollisionMask::default().cores);
        assert_eq!(config.world.tile_size, 64);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_bad_values() {
        let path = temp_file_path("bad");
        fs::write(&path, r#"{ "world": { "tile_size": 0 } }"#).expect("write config");
        let err = load_config(&path).expect_err("zero tile size");
        assert!(err.contains("tile_size"));

        fs::write(&path, r#"{ "physics": { "jump_impulse": 6.0 } }"#).expect("write config");
        assert!(load_config(&path).is_err());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_oversized_tiles() {
        let path = temp_file_path("huge_tile");
        fs::write(&path, r#"{ "world": { "tile_size": 100000000 } }"#).expect("write config");
        let err = load_config(&path).expect_err("tile size above the cap");
        assert!(err.contains("tile_size"));
        let _ = fs::remove_file(path);

        let mut config = GameConfig::default();
        config.world.tile_size = MAX_TILE_SIZE;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_negative_crate_tuning() {
        let path = temp_file_path("negative_crate");
        fs::write(&path, r#"{ "physics": { "crate_max_speed": -1.0 } }"#).expect("write config");
        let err = load_config(&path).expect_err("negative crate speed");
        assert!(err.contains("crate_max_speed"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_reports_path() {
        let path = temp_file_path("missing");
        let err = load_config(&path).expect_err("missing file");
        assert!(err.starts_with("Failed to read"));
    }
}
