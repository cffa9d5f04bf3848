//! Fixed-rate frame-cycling animation.
//!
//! A clip is an ordered list of texture handles plus an `advance_rate`: every
//! tick the state's timer grows by that rate, and when it reaches 1.0 the
//! timer wraps to zero and the frame index steps forward (modulo the clip
//! length). Timing is counted in ticks, not seconds, so playback speed assumes
//! the host's constant tick rate.
//!
//! The JSON format lists frames either explicitly or as a numbered
//! `sequence`, which keeps 20+ frame clips readable.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// An ordered sequence of frames associated with one behavioral state.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub frames: Vec<String>,
    pub advance_rate: f32,
}

impl AnimationClip {
    pub fn new(frames: Vec<String>, advance_rate: f32) -> Self {
        Self {
            frames,
            advance_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Top-level animation definition file.
#[derive(Debug, Clone)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub animations: HashMap<String, AnimationClip>,
}

/// Runtime playback position within whichever clip is active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub frame_index: usize,
    pub timer: f32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.timer = 0.0;
    }

    /// Advance one tick and return the frame to display.
    pub fn tick<'a>(&mut self, clip: &'a AnimationClip) -> &'a str {
        if clip.frames.is_empty() {
            self.reset();
            return "";
        }
        // A clip switch without reset() must still land inside the new clip.
        if self.frame_index >= clip.frames.len() {
            self.frame_index %= clip.frames.len();
        }

        self.timer += clip.advance_rate;
        if self.timer >= 1.0 {
            self.timer = 0.0;
            self.frame_index = (self.frame_index + 1) % clip.frames.len();
        }

        &clip.frames[self.frame_index]
    }

    pub fn current<'a>(&self, clip: &'a AnimationClip) -> &'a str {
        clip.frames
            .get(self.frame_index)
            .map(String::as_str)
            .unwrap_or("")
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationFileJson {
    version: String,
    animation_id: String,
    animations: HashMap<String, AnimationClipJson>,
}

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    #[serde(default)]
    frames: Vec<String>,
    #[serde(default)]
    sequence: Option<FrameSequenceJson>,
    advance_rate: f32,
}

/// `{prefix}{index padded to pad}{suffix}` for index in `0..count`.
#[derive(Debug, Deserialize)]
struct FrameSequenceJson {
    prefix: String,
    count: usize,
    #[serde(default)]
    pad: usize,
    #[serde(default)]
    suffix: String,
}

impl FrameSequenceJson {
    fn expand(&self) -> Vec<String> {
        (0..self.count)
            .map(|i| format!("{}{:0pad$}{}", self.prefix, i, self.suffix, pad = self.pad))
            .collect()
    }
}

/// Load an animation definition file from disk.
pub fn load_animation_file(path: &Path) -> Result<AnimationFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation file {}: {e}", path.display()))?;
    parse_animation_file(&raw, &path.display().to_string())
}

/// Parse an animation definition. `origin` names the source in error messages.
pub fn parse_animation_file(raw: &str, origin: &str) -> Result<AnimationFile, String> {
    let json: AnimationFileJson = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse animation file {origin}: {e}"))?;
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }

    let mut animations = HashMap::new();
    for (name, clip_json) in json.animations {
        let mut frames = clip_json.frames;
        if let Some(sequence) = &clip_json.sequence {
            frames.extend(sequence.expand());
        }
        let clip = AnimationClip::new(frames, clip_json.advance_rate);
        validate_clip(&name, &clip)?;
        animations.insert(name, clip);
    }

    Ok(AnimationFile {
        version: json.version,
        animation_id: json.animation_id,
        animations,
    })
}

fn validate_clip(name: &str, clip: &AnimationClip) -> Result<(), String> {
    if clip.frames.is_empty() {
        return Err(format!(
            "Animation validation failed: clip '{}' has no frames",
            name
        ));
    }
    for (i, frame) in clip.frames.iter().enumerate() {
        if frame.is_empty() {
            return Err(format!(
                "Animation validation failed: clip '{}' frame {} is empty",
                name, i
            ));
        }
    }
    if !(clip.advance_rate > 0.0 && clip.advance_rate <= 1.0) {
        return Err(format!(
            "Animation validation failed: clip '{}' advance_rate {} outside (0, 1]",
            name, clip.advance_rate
        ));
    }
    Ok(())
}
