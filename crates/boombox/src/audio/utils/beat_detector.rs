//! Adaptive-threshold beat detection over bass energy.
//!
//! A trigger raises the cutoff just above the triggering energy so a
//! sustained loud passage cannot re-fire every frame. After a short hold the
//! cutoff relaxes exponentially back down to the baseline threshold.

use crate::utils::ConfigError;

/// Cutoff multiplier applied to the energy that fired a beat
const RATCHET: f32 = 1.05;

/// Tuning for `BeatDetector`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatConfig {
    /// Baseline cutoff on the 0-255 energy scale
    pub threshold: f32,
    /// Per-frame cutoff multiplier once holding ends, in (0, 1)
    pub decay_rate: f32,
    /// Frames after a beat during which the cutoff stays put
    pub hold_frames: u32,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            threshold: 170.0,
            decay_rate: 0.98,
            hold_frames: 20,
        }
    }
}

impl BeatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::NegativeThreshold {
                name: "beat_threshold",
                value: self.threshold,
            });
        }
        // NaN fails both comparisons, so test for the valid range
        if !(self.decay_rate > 0.0 && self.decay_rate < 1.0) {
            return Err(ConfigError::DecayRate(self.decay_rate));
        }
        Ok(())
    }
}

/// Beat detector state machine (armed / holding)
#[derive(Clone, Debug, PartialEq)]
pub struct BeatDetector {
    config: BeatConfig,
    cutoff: f32,
    frames_since_last_beat: u32,
}

impl BeatDetector {
    /// Create an armed detector. Rejects invalid configuration.
    pub fn new(config: BeatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cutoff: config.threshold,
            frames_since_last_beat: config.hold_frames,
        })
    }

    /// Feed one frame of bass energy. Returns `true` on a beat.
    pub fn process(&mut self, energy: f32) -> bool {
        // Non-finite input counts as silence
        let energy = if energy.is_finite() { energy } else { 0.0 };

        if energy > self.cutoff {
            self.cutoff = energy * RATCHET;
            self.frames_since_last_beat = 0;
            return true;
        }

        if self.frames_since_last_beat <= self.config.hold_frames {
            self.frames_since_last_beat = self.frames_since_last_beat.saturating_add(1);
        } else {
            self.cutoff = (self.cutoff * self.config.decay_rate).max(self.config.threshold);
        }
        false
    }

    /// Re-arm to the initial state
    pub fn reset(&mut self) {
        self.cutoff = self.config.threshold;
        self.frames_since_last_beat = self.config.hold_frames;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn frames_since_last_beat(&self) -> u32 {
        self.frames_since_last_beat
    }
}
