//! Boundary types for the boombox visualizer
//!
//! The animation core only talks to audio through `AudioFeed` and to the
//! screen through `Canvas`, so it can run against nannou or a test double.

pub mod audio;
pub mod draw;
pub mod rect;

pub use audio::{AudioFeed, BandRange, ENERGY_MAX};
pub use draw::{BlendMode, BlendScope, Canvas, Hsba, NannouCanvas, Paint};
pub use rect::Bounds;
