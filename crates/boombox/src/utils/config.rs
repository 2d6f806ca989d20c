//! Configuration file management.
//!
//! Handles loading user preferences from `~/.boombox.toml` and turning them
//! into validated `Settings`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::audio::utils::BeatConfig;
use crate::audio::{AnalyzerConfig, BandRanges};
use crate::renderer::particles::{EmberConfig, LaserConfig, RingConfig};
use boombox_api::BandRange;

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;

const CONFIG_TEMPLATE: &str = r#"# boombox configuration file

# Input device used for live capture (default: system default input)
# input_device = "pipewire"

# Timeout in seconds when opening audio devices (default: 3)
# device_timeout_secs = 3

# Preset tracks, bound to keys 1-9 in order
# tracks = ["/home/me/music/loop.wav"]

# Seed for the particle random source (default: random each run)
# seed = 42

# Scale motion by elapsed time instead of one step per frame (default: false)
# realtime = false

# =============================================================================
# Analysis
# =============================================================================

# smoothing = 0.8                 # Share of previous spectrum kept each frame
# spectrum_bins = 1024            # Output bins (1-1024)
# bass_range = [20.0, 140.0]      # Hz
# mid_range = [140.0, 2000.0]
# treble_range = [2000.0, 8000.0]

# =============================================================================
# Beat detection
# =============================================================================

# beat_threshold = 170.0          # Baseline cutoff (0-255)
# beat_decay_rate = 0.98          # Cutoff decay per frame, must be in (0, 1)
# beat_hold_frames = 20           # Frames before the cutoff starts decaying

# =============================================================================
# Particles
# =============================================================================

# ring_floor = 50.0               # Bass needed before rings spawn
# ring_ceiling = 200              # Max live rings
# laser_ceiling = 80              # Max live laser beams
# ember_count = 24                # Embers per beat
# ember_ceiling = 120             # Max live embers
"#;

/// Rejected configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("decay rate must be in (0, 1), got {0}")]
    DecayRate(f32),
    #[error("{name} must be a non-negative number, got {value}")]
    NegativeThreshold { name: &'static str, value: f32 },
    #[error("smoothing must be in [0, 1), got {0}")]
    Smoothing(f32),
    #[error("spectrum bins must be between 1 and 1024, got {0}")]
    Bins(usize),
    #[error("{name} range [{low}, {high}] is not a valid frequency range")]
    BandRange {
        name: &'static str,
        low: f32,
        high: f32,
    },
    #[error("{0} must allow at least one particle")]
    Ceiling(&'static str),
    #[error("{name} floor {floor} must be below its ceiling {ceiling}")]
    Excitation {
        name: &'static str,
        floor: f32,
        ceiling: f32,
    },
}

/// Everything the visualizer needs, validated
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub analyzer: AnalyzerConfig,
    pub bands: BandRanges,
    pub beat: BeatConfig,
    pub rings: RingConfig,
    pub lasers: LaserConfig,
    pub embers: EmberConfig,
    pub seed: Option<u64>,
    pub realtime: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            bands: BandRanges::default(),
            beat: BeatConfig::default(),
            rings: RingConfig::default(),
            lasers: LaserConfig::default(),
            embers: EmberConfig::default(),
            seed: None,
            realtime: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer.validate()?;
        validate_band("bass_range", self.bands.bass)?;
        validate_band("mid_range", self.bands.mid)?;
        validate_band("treble_range", self.bands.treble)?;
        self.beat.validate()?;
        self.rings.validate()?;
        self.lasers.validate()?;
        self.embers.validate()?;
        Ok(())
    }
}

fn validate_band(name: &'static str, range: BandRange) -> Result<(), ConfigError> {
    let valid = range.low_hz.is_finite()
        && range.high_hz.is_finite()
        && range.low_hz >= 0.0
        && range.low_hz < range.high_hz;
    if valid {
        Ok(())
    } else {
        Err(ConfigError::BandRange {
            name,
            low: range.low_hz,
            high: range.high_hz,
        })
    }
}

#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
    pub input_device: Option<String>,
    pub device_timeout_secs: Option<u64>,
    pub tracks: Option<Vec<PathBuf>>,
    pub seed: Option<u64>,
    pub realtime: Option<bool>,

    // Analysis (flattened for simpler TOML)
    pub smoothing: Option<f32>,
    pub spectrum_bins: Option<usize>,
    pub bass_range: Option<[f32; 2]>,
    pub mid_range: Option<[f32; 2]>,
    pub treble_range: Option<[f32; 2]>,

    // Beat detection
    pub beat_threshold: Option<f32>,
    pub beat_decay_rate: Option<f32>,
    pub beat_hold_frames: Option<u32>,

    // Particles
    pub ring_floor: Option<f32>,
    pub ring_ceiling: Option<usize>,
    pub laser_ceiling: Option<usize>,
    pub ember_count: Option<usize>,
    pub ember_ceiling: Option<usize>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".boombox.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => tracing::info!("created config template at {}", path.display()),
                Err(e) => tracing::debug!("could not write config template: {e}"),
            }
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!("ignoring {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn device_timeout_secs(&self) -> u64 {
        self.device_timeout_secs
            .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    pub fn tracks(&self) -> &[PathBuf] {
        self.tracks.as_deref().unwrap_or_default()
    }

    /// Merge file values over defaults and validate
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let defaults = Settings::default();
        let range = |value: Option<[f32; 2]>, default: BandRange| {
            value.map_or(default, |[low, high]| BandRange::new(low, high))
        };

        let settings = Settings {
            analyzer: AnalyzerConfig {
                smoothing: self.smoothing.unwrap_or(defaults.analyzer.smoothing),
                bins: self.spectrum_bins.unwrap_or(defaults.analyzer.bins),
            },
            bands: BandRanges {
                bass: range(self.bass_range, defaults.bands.bass),
                mid: range(self.mid_range, defaults.bands.mid),
                treble: range(self.treble_range, defaults.bands.treble),
            },
            beat: BeatConfig {
                threshold: self.beat_threshold.unwrap_or(defaults.beat.threshold),
                decay_rate: self.beat_decay_rate.unwrap_or(defaults.beat.decay_rate),
                hold_frames: self.beat_hold_frames.unwrap_or(defaults.beat.hold_frames),
            },
            rings: RingConfig {
                floor: self.ring_floor.unwrap_or(defaults.rings.floor),
                ceiling: self.ring_ceiling.unwrap_or(defaults.rings.ceiling),
                ..defaults.rings
            },
            lasers: LaserConfig {
                ceiling: self.laser_ceiling.unwrap_or(defaults.lasers.ceiling),
                ..defaults.lasers
            },
            embers: EmberConfig {
                count: self.ember_count.unwrap_or(defaults.embers.count),
                ceiling: self.ember_ceiling.unwrap_or(defaults.embers.ceiling),
                ..defaults.embers
            },
            seed: self.seed,
            realtime: self.realtime.unwrap_or(defaults.realtime),
        };

        settings.validate()?;
        Ok(settings)
    }
}
