//! Engine-agnostic building blocks shared by the platformer and the sprite-sheet demo.

pub mod animation;
pub mod input;
pub mod sprite_sheet;
pub mod time;
