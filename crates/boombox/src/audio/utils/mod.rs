pub mod beat_detector;

pub use beat_detector::{BeatConfig, BeatDetector};
